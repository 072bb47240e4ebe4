//! Session state types for the FTP client

use crate::config::TransferMode;
use crate::features::FeatureSet;
use std::net::Ipv4Addr;

/// Control channel text encoding
///
/// Sessions start in ASCII and are promoted to UTF-8 when the server
/// advertises `UTF8` and accepts `OPTS UTF8 ON`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Ascii,
    Utf8,
}

/// Directory listing strategy, chosen once per login from FEAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListingStrategy {
    /// MLSD machine listings (RFC 3659)
    Mlsd,
    /// LIST with Unix/DOS line parsing
    List,
}

/// Mutable per-session state of the protocol engine
#[derive(Debug)]
pub(crate) struct SessionState {
    pub connected: bool,
    pub authenticated: bool,
    /// Canonical absolute path, starts with '/'
    pub working_directory: String,
    pub features: FeatureSet,
    pub encoding: Encoding,
    pub listing: ListingStrategy,
    /// Local IPv4 address of the control socket, for PORT mode
    pub local_ip: Option<Ipv4Addr>,
    pub transfer_mode: TransferMode,
}

impl SessionState {
    pub fn disconnected(mode: TransferMode) -> Self {
        Self {
            connected: false,
            authenticated: false,
            working_directory: "/".to_string(),
            features: FeatureSet::empty(),
            encoding: Encoding::Ascii,
            listing: ListingStrategy::List,
            local_ip: None,
            transfer_mode: mode,
        }
    }

    /// Reset everything a logout invalidates
    pub fn reset(&mut self) {
        self.connected = false;
        self.authenticated = false;
        self.working_directory = "/".to_string();
        self.features = FeatureSet::empty();
        self.encoding = Encoding::Ascii;
        self.listing = ListingStrategy::List;
        self.local_ip = None;
    }
}
