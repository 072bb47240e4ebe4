//! FTP server configuration

use rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Default control port for plain and explicit-TLS sessions
pub const DEFAULT_PORT: u16 = 21;

/// Default control port for implicit-TLS sessions
pub const DEFAULT_IMPLICIT_TLS_PORT: u16 = 990;

/// Channel encryption mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encryption {
    /// Plain FTP, no TLS on either channel
    #[default]
    None,
    /// TLS from the first byte of the control connection (port 990)
    Implicit,
    /// TLS negotiated on the plain control connection via AUTH TLS
    Explicit,
}

/// IP version preference for address resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IpVersion {
    /// IPv4 addresses only
    V4,
    /// IPv6 addresses only
    V6,
    /// First resolved address of either family
    #[default]
    Any,
}

/// TLS protocol versions offered during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TlsVersion {
    /// TLS 1.2
    Tls12,
    /// TLS 1.3
    Tls13,
}

/// Transfer type selected with the TYPE command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMode {
    /// ASCII transfers (`TYPE A`)
    #[default]
    Ascii,
    /// Binary/image transfers (`TYPE I`)
    Binary,
}

impl TransferMode {
    /// The type character sent on the wire
    pub fn type_char(self) -> char {
        match self {
            TransferMode::Ascii => 'A',
            TransferMode::Binary => 'I',
        }
    }
}

/// FTP server configuration
///
/// Immutable after the client is constructed. Fields are public; build one
/// with [`FtpConfig::new`] (or the TLS helpers) and adjust what you need.
///
/// # Example
///
/// ```
/// use ftp_rs::{FtpConfig, TransferMode};
///
/// let mut config = FtpConfig::new("ftp.example.com");
/// config.username = "user".into();
/// config.password = "pass".into();
/// config.mode = TransferMode::Binary;
/// ```
#[must_use]
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FtpConfig {
    /// Server hostname or address
    pub host: String,

    /// Control port (21, or 990 for implicit TLS)
    pub port: u16,

    /// Username; an empty string logs in as "anonymous"
    pub username: String,

    /// Password; empty for anonymous sessions
    pub password: String,

    /// Directory entered after login; created recursively if missing
    pub base_directory: String,

    /// Use passive mode (EPSV/PASV) for data connections; active PORT mode otherwise
    pub use_passive: bool,

    /// Control/data channel encryption mode
    pub encryption: Encryption,

    /// Accept any server certificate (self-signed, expired, wrong host)
    ///
    /// **Security Warning:** disables certificate validation, making the
    /// connection vulnerable to man-in-the-middle attacks. Only use this for
    /// testing or with servers you trust on a secure network.
    pub ignore_certificate_errors: bool,

    /// Client certificate chain; the first entry also backs the server-role
    /// handshake on active-mode data sockets under explicit TLS
    #[cfg_attr(feature = "serde", serde(skip))]
    pub client_certificates: Vec<CertificateDer<'static>>,

    /// Private key for the client certificate chain
    #[cfg_attr(feature = "serde", serde(skip))]
    pub client_key: Option<PrivateKeyDer<'static>>,

    /// TLS versions to offer; `None` uses the rustls defaults
    pub ssl_protocols: Option<Vec<TlsVersion>>,

    /// Address family preference when resolving `host`
    pub ip_version: IpVersion,

    /// Socket read/write timeout in seconds
    pub timeout_seconds: u64,

    /// Shorter timeout applied to the completion read when closing a data
    /// stream, in milliseconds
    pub disconnect_timeout_ms: Option<u64>,

    /// Transfer type sent with TYPE at login
    pub mode: TransferMode,

    /// Optional second TYPE character (e.g. 'N'); `'\0'` means none
    pub mode_second_type: Option<char>,
}

impl FtpConfig {
    /// Create a plain-FTP configuration with defaults (port 21, anonymous,
    /// passive mode, ASCII transfers, 30 second timeouts)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            base_directory: "/".to_string(),
            use_passive: true,
            encryption: Encryption::None,
            ignore_certificate_errors: false,
            client_certificates: Vec::new(),
            client_key: None,
            ssl_protocols: None,
            ip_version: IpVersion::Any,
            timeout_seconds: 30,
            disconnect_timeout_ms: None,
            mode: TransferMode::Ascii,
            mode_second_type: None,
        }
    }

    /// Create a configuration for implicit TLS on port 990
    pub fn implicit_tls(host: impl Into<String>) -> Self {
        let mut config = Self::new(host);
        config.port = DEFAULT_IMPLICIT_TLS_PORT;
        config.encryption = Encryption::Implicit;
        config
    }

    /// Create a configuration for explicit TLS (AUTH TLS on port 21)
    pub fn explicit_tls(host: impl Into<String>) -> Self {
        let mut config = Self::new(host);
        config.encryption = Encryption::Explicit;
        config
    }

    /// Socket timeout as a [`std::time::Duration`]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }

    /// Completion-read timeout override, when configured
    pub fn disconnect_timeout(&self) -> Option<std::time::Duration> {
        self.disconnect_timeout_ms
            .map(std::time::Duration::from_millis)
    }

    /// Check required fields before connecting
    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::FtpError::Config("host must not be empty".into()));
        }
        Ok(())
    }
}
