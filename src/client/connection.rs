//! Connection establishment for the FTP client
//!
//! TCP connect with socket tuning, TLS activation (implicit from byte zero,
//! or explicit via AUTH TLS on the plain banner), the welcome exchange, and
//! the login/logout sequences.

use crate::commands::FtpCommand;
use crate::config::{Encryption, FtpConfig, IpVersion, TlsVersion};
use crate::error::{FtpError, Result};
use crate::features::FeatureSet;
use crate::response::{Reply, StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    ClientConfig, DigitallySignedStruct, RootCertStore, ServerConfig as TlsServerConfig,
    SignatureScheme, SupportedProtocolVersion, version,
};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::{debug, trace, warn};

use super::FtpClient;
use super::channel::{ControlChannel, MaybeTlsStream, read_reply_from};
use super::state::{Encoding, ListingStrategy};

/// Certificate verifier that accepts anything, backing the
/// `ignore_certificate_errors` flag
///
/// **Security Warning:** disables all certificate validation; connections
/// are open to man-in-the-middle attacks. Only for testing or servers
/// trusted on a secure network.
#[derive(Debug)]
pub(super) struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}

fn protocol_versions(config: &FtpConfig) -> Vec<&'static SupportedProtocolVersion> {
    match &config.ssl_protocols {
        Some(list) => list
            .iter()
            .map(|v| match v {
                TlsVersion::Tls12 => &version::TLS12,
                TlsVersion::Tls13 => &version::TLS13,
            })
            .collect(),
        None => tokio_rustls::rustls::DEFAULT_VERSIONS.to_vec(),
    }
}

fn install_crypto_provider() {
    use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
    let _ = CryptoProvider::install_default(ring::default_provider());
}

/// Build the rustls client configuration for control and passive data
/// channels
pub(crate) fn tls_client_config(config: &FtpConfig) -> Result<ClientConfig> {
    install_crypto_provider();

    let versions = protocol_versions(config);
    let builder = ClientConfig::builder_with_protocol_versions(&versions);

    let builder = if config.ignore_certificate_errors {
        warn!("TLS certificate validation disabled - connection vulnerable to MITM attacks");
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
    } else {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots)
    };

    let tls = match (&config.client_certificates[..], &config.client_key) {
        (certs @ [_, ..], Some(key)) => builder
            .with_client_auth_cert(certs.to_vec(), key.clone_key())
            .map_err(|e| FtpError::Tls(format!("invalid client certificate: {e}")))?,
        _ => builder.with_no_client_auth(),
    };
    Ok(tls)
}

/// Build the TLS acceptor for active-mode data sockets, backed by the
/// configured certificate chain
pub(crate) fn tls_acceptor(config: &FtpConfig) -> Result<TlsAcceptor> {
    install_crypto_provider();

    let (certs, key) = match (&config.client_certificates[..], &config.client_key) {
        (certs @ [_, ..], Some(key)) => (certs.to_vec(), key.clone_key()),
        _ => {
            return Err(FtpError::Config(
                "active-mode TLS requires client_certificates and client_key".into(),
            ));
        }
    };

    let versions = protocol_versions(config);
    let server = TlsServerConfig::builder_with_protocol_versions(&versions)
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| FtpError::Tls(format!("invalid data-channel certificate: {e}")))?;
    Ok(TlsAcceptor::from(Arc::new(server)))
}

/// Upgrade a TCP stream to TLS in the client role (SNI = configured host)
pub(crate) async fn wrap_client_tls(config: &FtpConfig, tcp: TcpStream) -> Result<MaybeTlsStream> {
    let connector = TlsConnector::from(Arc::new(tls_client_config(config)?));
    let name = ServerName::try_from(config.host.as_str())
        .map_err(|e| FtpError::Tls(format!("invalid server name: {e}")))?
        .to_owned();

    let stream = timeout(config.timeout(), connector.connect(name, tcp))
        .await
        .map_err(|_| FtpError::Timeout)?
        .map_err(|e| FtpError::Tls(format!("TLS handshake failed: {e}")))?;
    Ok(MaybeTlsStream::ClientTls(Box::new(stream)))
}

async fn resolve_addr(config: &FtpConfig, port: u16) -> Result<SocketAddr> {
    use std::net::ToSocketAddrs;

    let host = config.host.clone();
    let addrs = tokio::task::spawn_blocking(move || {
        (host.as_str(), port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>())
    })
    .await
    .map_err(|e| FtpError::Io(std::io::Error::other(format!("task join error: {e}"))))?
    .map_err(|e| {
        FtpError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("failed to resolve {}: {e}", config.host),
        ))
    })?;

    addrs
        .into_iter()
        .find(|addr| match config.ip_version {
            IpVersion::V4 => addr.is_ipv4(),
            IpVersion::V6 => addr.is_ipv6(),
            IpVersion::Any => true,
        })
        .ok_or_else(|| FtpError::Config(format!("no usable address for host {}", config.host)))
}

/// Open a tuned TCP connection to the configured host on `port`
///
/// Used for the control connection and for passive data connections, which
/// deliberately go to the configured host rather than the address in the
/// PASV reply (NAT-friendly).
pub(crate) async fn connect_tcp(config: &FtpConfig, port: u16) -> Result<TcpStream> {
    use socket2::{Domain, Protocol, Socket, Type};

    let addr = resolve_addr(config, port).await?;
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(FtpError::Io)?;
    // Low-latency command/reply exchanges
    socket.set_nodelay(true).map_err(FtpError::Io)?;

    // Connect while the socket is still blocking, then hand it to tokio
    let stream = timeout(
        config.timeout(),
        tokio::task::spawn_blocking(move || -> std::io::Result<std::net::TcpStream> {
            socket.connect(&addr.into())?;
            socket.set_nonblocking(true)?;
            Ok(socket.into())
        }),
    )
    .await
    .map_err(|_| FtpError::Timeout)?
    .map_err(|e| FtpError::Io(std::io::Error::other(format!("task join error: {e}"))))?
    .map_err(FtpError::Io)?;

    TcpStream::from_std(stream).map_err(FtpError::Io)
}

/// Read one reply during the pre-channel welcome exchange
async fn handshake_reply(stream: &mut MaybeTlsStream, limit: Duration) -> Result<Reply> {
    let mut reader = BufReader::new(stream);
    timeout(limit, read_reply_from(&mut reader))
        .await
        .map_err(|_| FtpError::Timeout)?
}

async fn handshake_send(
    stream: &mut MaybeTlsStream,
    command: &FtpCommand,
    limit: Duration,
) -> Result<()> {
    trace!("-> {}", command);
    timeout(limit, stream.write_all(command.to_wire().as_bytes()))
        .await
        .map_err(|_| FtpError::Timeout)??;
    timeout(limit, stream.flush())
        .await
        .map_err(|_| FtpError::Timeout)??;
    Ok(())
}

impl FtpClient {
    /// Connect and log in
    ///
    /// Runs the full session setup: TCP connect, TLS as configured, welcome
    /// banner, USER/PASS, `PBSZ 0` / `PROT P` on encrypted sessions, FEAT,
    /// listing strategy selection, UTF-8 enablement, TYPE, and the base
    /// directory. An already-connected client is logged out first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - [`FtpError::Config`] - required configuration is missing
    /// - [`FtpError::Io`] / [`FtpError::Tls`] - connect or handshake failed
    /// - [`FtpError::Protocol`] - the server rejected a step of the login
    /// - [`FtpError::Timeout`] - the server did not respond in time
    pub async fn login(&mut self) -> Result<()> {
        self.config.validate()?;
        if self.state.connected {
            self.logout().await?;
        }

        debug!(
            "connecting to {}:{} ({:?})",
            self.config.host, self.config.port, self.config.encryption
        );
        let tcp = connect_tcp(&self.config, self.config.port).await?;
        let local_ip = match tcp.local_addr() {
            Ok(SocketAddr::V4(v4)) => Some(*v4.ip()),
            _ => None,
        };

        // Implicit TLS wraps before the banner; explicit reads the banner
        // in the clear, then upgrades after AUTH TLS
        let mut stream = match self.config.encryption {
            Encryption::Implicit => wrap_client_tls(&self.config, tcp).await?,
            _ => MaybeTlsStream::Plain(tcp),
        };

        let welcome = handshake_reply(&mut stream, self.config.timeout()).await?;
        if !welcome.is_success() {
            return Err(FtpError::Protocol {
                code: welcome.code(),
                message: welcome.message,
            });
        }
        debug!("server welcome: {} {}", welcome.code(), welcome.message);

        if self.config.encryption == Encryption::Explicit {
            handshake_send(&mut stream, &FtpCommand::AuthTls, self.config.timeout()).await?;
            let reply = handshake_reply(&mut stream, self.config.timeout()).await?;
            if !reply.is_success() {
                return Err(FtpError::Protocol {
                    code: reply.code(),
                    message: reply.message,
                });
            }
            stream = match stream {
                MaybeTlsStream::Plain(tcp) => wrap_client_tls(&self.config, tcp).await?,
                already_tls => already_tls,
            };
        }

        let encrypted = !matches!(stream, MaybeTlsStream::Plain(_));
        self.channel = Some(Arc::new(ControlChannel::new(
            stream,
            encrypted,
            self.config.timeout(),
        )));
        self.state.connected = true;
        self.state.local_ip = local_ip;

        if let Err(e) = self.login_sequence().await {
            // Leave no half-authenticated session behind
            let _ = self.logout().await;
            return Err(e);
        }
        Ok(())
    }

    async fn login_sequence(&mut self) -> Result<()> {
        let channel = self.channel()?.clone();

        let username = if self.config.username.trim().is_empty() {
            "anonymous".to_string()
        } else {
            self.config.username.clone()
        };
        let reply = channel
            .send_command(&FtpCommand::User(username))
            .await?
            .require(&[
                StatusCode::LoggedIn,
                StatusCode::NeedPassword,
                StatusCode::NeedAccount,
            ])?;
        if reply.status != StatusCode::LoggedIn {
            channel
                .send_command(&FtpCommand::Pass(self.config.password.clone()))
                .await?
                .require(&[StatusCode::LoggedIn])?;
        }
        self.state.authenticated = true;
        debug!("login accepted");

        if channel.is_encrypted() {
            channel
                .send_command(&FtpCommand::Pbsz("0".into()))
                .await?
                .require_success()?;
            channel
                .send_command(&FtpCommand::Prot("P".into()))
                .await?
                .require_success()?;
        }

        let feat = channel.send_command(&FtpCommand::Feat).await?;
        self.state.features = if feat.is_success() {
            FeatureSet::from_reply_lines(&feat.lines)
        } else {
            FeatureSet::empty()
        };

        self.state.listing = if self.state.features.supports("MLSD") {
            ListingStrategy::Mlsd
        } else {
            ListingStrategy::List
        };
        debug!(
            "server features: {:?}, listing via {:?}",
            self.state.features.lines(),
            self.state.listing
        );

        if self.state.features.supports("UTF8") && self.state.encoding == Encoding::Ascii {
            channel
                .send_command(&FtpCommand::Opts("UTF8 ON".into()))
                .await?
                .require_success()?;
            self.state.encoding = Encoding::Utf8;
        }

        let type_arg = super::type_argument(self.config.mode, self.config.mode_second_type);
        channel
            .send_command(&FtpCommand::Type(type_arg))
            .await?
            .require_success()?;
        self.state.transfer_mode = self.config.mode;

        if self.config.base_directory != "/" {
            self.enter_base_directory().await?;
        }
        Ok(())
    }

    async fn enter_base_directory(&mut self) -> Result<()> {
        let base = self.config.base_directory.clone();
        match self.change_working_directory(&base).await {
            Ok(()) => Ok(()),
            Err(FtpError::Protocol { code: 550, .. }) => {
                self.create_directory(&base).await?;
                self.change_working_directory(&base).await
            }
            Err(e) => Err(e),
        }
    }

    /// Log out and disconnect
    ///
    /// Drains stale data, sends QUIT when the session is connected, and
    /// shuts the control connection down. Cleanup failures are logged, not
    /// surfaced; the client is disconnected afterwards either way.
    pub async fn logout(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            channel.drain_stale().await;
            if self.state.connected {
                match channel.send_command(&FtpCommand::Quit).await {
                    Ok(reply) => debug!("server goodbye: {} {}", reply.code(), reply.message),
                    Err(e) => warn!("QUIT failed during logout: {e}"),
                }
            }
            if let Err(e) = channel.shutdown().await {
                warn!("error closing control connection: {e}");
            }
        }
        self.state.reset();
        Ok(())
    }
}
