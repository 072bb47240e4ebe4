//! Data-channel negotiation
//!
//! Passive mode tries EPSV (RFC 2428) and falls back to PASV (RFC 959);
//! active mode binds a local listener and announces it with PORT. Either
//! way the result is a one-shot byte stream, TLS-wrapped when the control
//! channel is encrypted: client role on passive connections, server role on
//! accepted active-mode sockets.

use crate::commands::FtpCommand;
use crate::config::FtpConfig;
use crate::error::{FtpError, Result};
use crate::response::{Reply, StatusCode};
use rand::Rng;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use super::FtpClient;
use super::channel::MaybeTlsStream;
use super::connection::{connect_tcp, tls_acceptor, wrap_client_tls};

/// Bind retries before active-mode negotiation gives up
const BIND_ATTEMPTS: usize = 10;

/// A negotiated but not yet finished data connection
///
/// The transfer command goes out between negotiation and `finish`: passive
/// servers expect the client connection first, active servers dial back
/// only after accepting the command.
pub(crate) enum DataConnection {
    Passive(TcpStream),
    Active(TcpListener),
}

impl DataConnection {
    /// Turn the negotiated connection into a usable byte stream
    pub(crate) async fn finish(
        self,
        config: &FtpConfig,
        encrypted: bool,
    ) -> Result<MaybeTlsStream> {
        match self {
            DataConnection::Passive(tcp) => {
                if encrypted {
                    wrap_client_tls(config, tcp).await
                } else {
                    Ok(MaybeTlsStream::Plain(tcp))
                }
            }
            DataConnection::Active(listener) => {
                let (tcp, peer) = timeout(config.timeout(), listener.accept())
                    .await
                    .map_err(|_| FtpError::Timeout)?
                    .map_err(FtpError::Io)?;
                debug!("accepted data connection from {peer}");
                if encrypted {
                    let acceptor = tls_acceptor(config)?;
                    let stream = timeout(config.timeout(), acceptor.accept(tcp))
                        .await
                        .map_err(|_| FtpError::Timeout)?
                        .map_err(|e| {
                            FtpError::Tls(format!("data-channel TLS handshake failed: {e}"))
                        })?;
                    Ok(MaybeTlsStream::ServerTls(Box::new(stream)))
                } else {
                    Ok(MaybeTlsStream::Plain(tcp))
                }
            }
        }
    }
}

fn invalid(message: &str) -> FtpError {
    FtpError::InvalidReply(message.to_string())
}

/// Extract the port from an EPSV 229 reply: `... (|||port|)`
pub(crate) fn parse_epsv_port(message: &str) -> Result<u16> {
    let open = message.find('(').ok_or_else(|| invalid(message))?;
    let close = message[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or_else(|| invalid(message))?;
    let fields: Vec<&str> = message[open + 1..close].split('|').collect();
    fields
        .get(3)
        .and_then(|port| port.trim().parse::<u16>().ok())
        .ok_or_else(|| invalid(message))
}

/// Extract the port from a PASV 227 reply: `(h1,h2,h3,h4,p1,p2)`
///
/// The host component is ignored; data connections go to the configured
/// host, which keeps NAT setups working.
pub(crate) fn parse_pasv_port(message: &str) -> Result<u16> {
    let inner = match (message.find('('), message.rfind(')')) {
        (Some(open), Some(close)) if close > open => &message[open + 1..close],
        _ => message,
    };
    let numbers: Vec<u16> = inner
        .split(',')
        .map(|token| token.trim().parse::<u16>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid(message))?;
    if numbers.len() != 6 || numbers.iter().any(|n| *n > 255) {
        return Err(invalid(message));
    }
    Ok(numbers[4] * 256 + numbers[5])
}

/// Bind a listener on a random port in the traditional client range
///
/// `port = (p1 << 8) | p2` with `p1` in 5..200 and `p2` in 0..200 stays
/// above 1024; bind collisions retry with fresh randoms.
async fn bind_active_listener(ip: Ipv4Addr) -> Result<(TcpListener, u16, u16)> {
    for attempt in 1..=BIND_ATTEMPTS {
        let (p1, p2) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(5u16..200), rng.gen_range(0u16..200))
        };
        let port = (p1 << 8) | p2;
        match TcpListener::bind(SocketAddrV4::new(ip, port)).await {
            Ok(listener) => {
                debug!("listening for active data connection on {ip}:{port}");
                return Ok((listener, p1, p2));
            }
            Err(e) => warn!("bind attempt {attempt} on port {port} failed: {e}"),
        }
    }
    Err(FtpError::Io(std::io::Error::other(format!(
        "could not bind an active-mode port after {BIND_ATTEMPTS} attempts"
    ))))
}

impl FtpClient {
    async fn negotiate_data_connection(&self) -> Result<DataConnection> {
        let channel = self.channel()?.clone();

        if self.config.use_passive {
            let reply = channel.send_command(&FtpCommand::Epsv).await?;
            let port = if reply.status == StatusCode::EnteringExtendedPassive {
                parse_epsv_port(&reply.message)?
            } else {
                trace!("EPSV refused ({}), falling back to PASV", reply.code());
                let reply = channel
                    .send_command(&FtpCommand::Pasv)
                    .await?
                    .require(&[StatusCode::EnteringPassive])?;
                parse_pasv_port(&reply.message)?
            };
            debug!("passive data connection on port {port}");
            let tcp = connect_tcp(&self.config, port).await?;
            Ok(DataConnection::Passive(tcp))
        } else {
            let ip = self.state.local_ip.ok_or_else(|| {
                FtpError::Config("active mode requires an IPv4 control connection".into())
            })?;
            let (listener, p1, p2) = bind_active_listener(ip).await?;
            let o = ip.octets();
            let endpoint = format!("{},{},{},{},{},{}", o[0], o[1], o[2], o[3], p1, p2);
            channel
                .send_command(&FtpCommand::Port(endpoint))
                .await?
                .require_success()?;
            Ok(DataConnection::Active(listener))
        }
    }

    /// Acquire the transfer slot, negotiate a data connection, issue the
    /// transfer command and finish the stream
    ///
    /// The returned permit rides with the stream; dropping it frees the
    /// slot on every exit path.
    pub(crate) async fn open_data_channel(
        &self,
        command: FtpCommand,
        accepted: &[StatusCode],
    ) -> Result<(MaybeTlsStream, Reply, OwnedSemaphorePermit)> {
        let channel = self.channel()?.clone();
        let permit = self
            .data_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FtpError::NotConnected)?;

        let connection = self.negotiate_data_connection().await?;
        let reply = channel.send_command(&command).await?.require(accepted)?;
        let stream = connection.finish(&self.config, channel.is_encrypted()).await?;
        Ok((stream, reply, permit))
    }
}
