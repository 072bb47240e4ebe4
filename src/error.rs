//! FTP error types

use thiserror::Error;

/// FTP protocol and connection errors
#[derive(Error, Debug)]
pub enum FtpError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error during secure connection
    #[error("TLS error: {0}")]
    Tls(String),

    /// Connection or command timeout
    #[error("Connection timeout")]
    Timeout,

    /// Malformed reply from server
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// FTP protocol error with response code
    #[error("FTP error {code}: {message}")]
    Protocol {
        /// FTP response code (e.g., 530, 550, 553)
        code: u16,
        /// Error message from server
        message: String,
    },

    /// Operation requires an open control connection
    #[error("Not connected")]
    NotConnected,

    /// Operation requires a completed login
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Connection closed unexpectedly
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected path argument (empty or ".")
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Result type alias using FtpError
pub type Result<T> = std::result::Result<T, FtpError>;
