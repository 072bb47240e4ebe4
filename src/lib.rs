#![doc = include_str!("../README.md")]

mod client;
/// FTP command envelopes and wire serialization
pub mod commands;
mod config;
mod error;
mod features;
/// Directory listing parsers (Unix, DOS, MLSD)
pub mod list;
mod response;

pub use client::{DataStream, FtpClient};
pub use commands::FtpCommand;
pub use config::{Encryption, FtpConfig, IpVersion, TlsVersion, TransferMode};
pub use error::{FtpError, Result};
pub use features::FeatureSet;
pub use list::{NodeInformation, NodeKind};
pub use response::{Reply, StatusCode, terminal_line};
