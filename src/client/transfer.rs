//! File transfer operations: SIZE, RETR and STOR

use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::response::StatusCode;
use tracing::debug;

use super::{DataStream, FtpClient};

/// Codes a server may answer a transfer command with; 226 means the data
/// connection was already complete when the command landed
const TRANSFER_START: &[StatusCode] = &[
    StatusCode::DataAlreadyOpen,
    StatusCode::OpeningData,
    StatusCode::ClosingData,
];

impl FtpClient {
    /// Query a file's size in bytes (SIZE)
    ///
    /// # Errors
    ///
    /// Returns [`FtpError::Protocol`] when the server does not answer 213,
    /// [`FtpError::InvalidReply`] when the reply carries no decimal size.
    pub async fn get_file_size(&mut self, name: &str) -> Result<u64> {
        let channel = self.authenticated_channel()?;
        let reply = channel
            .send_command(&FtpCommand::Size(name.to_string()))
            .await?
            .require(&[StatusCode::FileStatus])?;
        reply
            .message
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| FtpError::InvalidReply(reply.message.clone()))
    }

    /// Start downloading a file (RETR) and return its data stream
    ///
    /// Read the stream to EOF, then call [`DataStream::close`] to consume
    /// the transfer completion reply.
    pub async fn open_read(&mut self, name: &str) -> Result<DataStream> {
        let channel = self.authenticated_channel()?;
        debug!("downloading {name}");
        let (stream, reply, permit) = self
            .open_data_channel(FtpCommand::Retr(name.to_string()), TRANSFER_START)
            .await?;
        Ok(DataStream::new(
            stream,
            channel,
            reply.status != StatusCode::ClosingData,
            self.config.disconnect_timeout(),
            permit,
        ))
    }

    /// Start uploading a file (STOR) and return its data stream
    ///
    /// Parent directories in `name` are created first. Write the payload,
    /// then call [`DataStream::close`] to consume the completion reply.
    pub async fn open_write(&mut self, name: &str) -> Result<DataStream> {
        self.authenticated_channel()?;

        if let Some(idx) = name.rfind('/') {
            let parent = name[..idx].to_string();
            if !parent.is_empty() {
                match self.create_directory(&parent).await {
                    Ok(()) => {}
                    // already present; MKD answers 550 for existing paths
                    Err(FtpError::Protocol { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        let channel = self.authenticated_channel()?;
        debug!("uploading {name}");
        let (stream, reply, permit) = self
            .open_data_channel(FtpCommand::Stor(name.to_string()), TRANSFER_START)
            .await?;
        Ok(DataStream::new(
            stream,
            channel,
            reply.status != StatusCode::ClosingData,
            self.config.disconnect_timeout(),
            permit,
        ))
    }
}
