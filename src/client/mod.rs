//! Async FTP client: session lifecycle and protocol operations

mod channel;
mod connection;
mod data;
mod dirops;
mod listing;
mod state;
mod stream;
mod transfer;

pub use stream::DataStream;

use crate::commands::FtpCommand;
use crate::config::{FtpConfig, TransferMode};
use crate::error::{FtpError, Result};
use crate::features::FeatureSet;
use crate::response::Reply;
use channel::ControlChannel;
use state::SessionState;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Async FTP/FTPS client
///
/// One client is one session: a persistent control connection plus
/// transient, one-shot data connections for listings and transfers. The
/// client is not reentrant; issue one operation at a time. At most one
/// data transfer runs per session, enforced internally.
///
/// # Example
///
/// ```no_run
/// use ftp_rs::{FtpClient, FtpConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = FtpConfig::new("ftp.example.com");
/// config.username = "user".into();
/// config.password = "pass".into();
///
/// let mut client = FtpClient::new(config);
/// client.login().await?;
/// let nodes = client.list_all().await?;
/// println!("{} entries", nodes.len());
/// client.logout().await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct FtpClient {
    config: Arc<FtpConfig>,
    channel: Option<Arc<ControlChannel>>,
    state: SessionState,
    /// At most one concurrent data transfer per session
    data_semaphore: Arc<Semaphore>,
}

impl FtpClient {
    /// Create a client; no connection is made until [`login`](Self::login)
    pub fn new(config: FtpConfig) -> Self {
        let mode = config.mode;
        Self {
            config: Arc::new(config),
            channel: None,
            state: SessionState::disconnected(mode),
            data_semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &FtpConfig {
        &self.config
    }

    /// Whether the control connection is open
    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    /// Whether login completed on this session
    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    /// Whether the control channel is TLS-wrapped
    pub fn is_encrypted(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|channel| channel.is_encrypted())
    }

    /// The current working directory (absolute, `/`-rooted)
    pub fn working_directory(&self) -> &str {
        &self.state.working_directory
    }

    /// Extensions the server advertised via FEAT
    pub fn features(&self) -> &FeatureSet {
        &self.state.features
    }

    /// The transfer type currently selected with TYPE
    pub fn transfer_mode(&self) -> TransferMode {
        self.state.transfer_mode
    }

    /// Poll whether the server closed the control connection
    pub async fn is_server_disconnected(&self) -> bool {
        match &self.channel {
            Some(channel) => channel.is_disconnected().await,
            None => true,
        }
    }

    /// Send any command envelope and return the raw reply
    ///
    /// Escape hatch; no status checking is applied.
    pub async fn send_command(&mut self, command: FtpCommand) -> Result<Reply> {
        let channel = self.channel()?.clone();
        channel.send_command(&command).await
    }

    /// Send a raw command line (CRLF appended) and return the raw reply
    pub async fn send_raw_command(&mut self, line: &str) -> Result<Reply> {
        let channel = self.channel()?.clone();
        channel.send_raw(line).await
    }

    /// Select the transfer type (`TYPE A` / `TYPE I`, optional second
    /// character)
    pub async fn set_transfer_mode(
        &mut self,
        mode: TransferMode,
        second_type: Option<char>,
    ) -> Result<()> {
        let channel = self.authenticated_channel()?;
        channel
            .send_command(&FtpCommand::Type(type_argument(mode, second_type)))
            .await?
            .require_success()?;
        self.state.transfer_mode = mode;
        Ok(())
    }

    /// Announce a client name to the server (CLNT)
    pub async fn set_client_name(&mut self, name: &str) -> Result<()> {
        let channel = self.authenticated_channel()?;
        channel
            .send_command(&FtpCommand::Clnt(name.to_string()))
            .await?
            .require_success()?;
        Ok(())
    }

    pub(crate) fn channel(&self) -> Result<&Arc<ControlChannel>> {
        self.channel.as_ref().ok_or(FtpError::NotConnected)
    }

    pub(crate) fn authenticated_channel(&self) -> Result<Arc<ControlChannel>> {
        let channel = self.channel()?;
        if !self.state.authenticated {
            return Err(FtpError::NotAuthenticated);
        }
        Ok(channel.clone())
    }
}

impl Drop for FtpClient {
    fn drop(&mut self) {
        // The graceful path is logout(); dropping just closes the socket
        debug!("FtpClient dropped");
    }
}

/// TYPE argument: the mode character, optionally followed by a second type
/// character (`'\0'` counts as absent)
pub(crate) fn type_argument(mode: TransferMode, second_type: Option<char>) -> String {
    match second_type {
        Some(second) if second != '\0' => format!("{} {}", mode.type_char(), second),
        _ => mode.type_char().to_string(),
    }
}
