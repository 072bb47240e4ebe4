//! FTP reply model: status codes and multi-line reply framing

use crate::error::{FtpError, Result};

/// FTP reply status codes (RFC 959, RFC 2428, RFC 3659)
///
/// Codes the client branches on have named variants; anything else is
/// carried verbatim in [`StatusCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 125 - Data connection already open; transfer starting
    DataAlreadyOpen,
    /// 150 - File status okay; about to open data connection
    OpeningData,
    /// 200 - Command okay
    CommandOk,
    /// 211 - System status reply (FEAT)
    SystemStatus,
    /// 213 - File status reply (SIZE)
    FileStatus,
    /// 214 - Help message
    HelpMessage,
    /// 221 - Service closing control connection
    ClosingControl,
    /// 226 - Closing data connection; transfer complete
    ClosingData,
    /// 227 - Entering passive mode
    EnteringPassive,
    /// 229 - Entering extended passive mode
    EnteringExtendedPassive,
    /// 230 - User logged in, proceed
    LoggedIn,
    /// 250 - Requested file action okay, completed
    FileActionOk,
    /// 257 - Pathname created (MKD, PWD)
    PathnameCreated,
    /// 331 - User name okay, need password
    NeedPassword,
    /// 332 - Need account for login
    NeedAccount,
    /// 350 - Requested file action pending further information (RNFR)
    FileActionPending,
    /// 421 - Service not available, closing control connection
    ServiceNotAvailable,
    /// 450 - Requested file action not taken; file busy
    FileBusy,
    /// 500 - Syntax error, command unrecognized
    SyntaxError,
    /// 502 - Command not implemented
    NotImplemented,
    /// 530 - Not logged in
    NotLoggedIn,
    /// 550 - Requested action not taken; file unavailable
    FileUnavailable,
    /// 553 - Requested action not taken; file name not allowed
    InvalidFileName,
    /// Any other three-digit code
    Other(u16),
}

impl StatusCode {
    /// Map a three-digit code to its variant
    pub fn from_u16(code: u16) -> Self {
        match code {
            125 => StatusCode::DataAlreadyOpen,
            150 => StatusCode::OpeningData,
            200 => StatusCode::CommandOk,
            211 => StatusCode::SystemStatus,
            213 => StatusCode::FileStatus,
            214 => StatusCode::HelpMessage,
            221 => StatusCode::ClosingControl,
            226 => StatusCode::ClosingData,
            227 => StatusCode::EnteringPassive,
            229 => StatusCode::EnteringExtendedPassive,
            230 => StatusCode::LoggedIn,
            250 => StatusCode::FileActionOk,
            257 => StatusCode::PathnameCreated,
            331 => StatusCode::NeedPassword,
            332 => StatusCode::NeedAccount,
            350 => StatusCode::FileActionPending,
            421 => StatusCode::ServiceNotAvailable,
            450 => StatusCode::FileBusy,
            500 => StatusCode::SyntaxError,
            502 => StatusCode::NotImplemented,
            530 => StatusCode::NotLoggedIn,
            550 => StatusCode::FileUnavailable,
            553 => StatusCode::InvalidFileName,
            other => StatusCode::Other(other),
        }
    }

    /// The numeric code
    pub fn code(self) -> u16 {
        match self {
            StatusCode::DataAlreadyOpen => 125,
            StatusCode::OpeningData => 150,
            StatusCode::CommandOk => 200,
            StatusCode::SystemStatus => 211,
            StatusCode::FileStatus => 213,
            StatusCode::HelpMessage => 214,
            StatusCode::ClosingControl => 221,
            StatusCode::ClosingData => 226,
            StatusCode::EnteringPassive => 227,
            StatusCode::EnteringExtendedPassive => 229,
            StatusCode::LoggedIn => 230,
            StatusCode::FileActionOk => 250,
            StatusCode::PathnameCreated => 257,
            StatusCode::NeedPassword => 331,
            StatusCode::NeedAccount => 332,
            StatusCode::FileActionPending => 350,
            StatusCode::ServiceNotAvailable => 421,
            StatusCode::FileBusy => 450,
            StatusCode::SyntaxError => 500,
            StatusCode::NotImplemented => 502,
            StatusCode::NotLoggedIn => 530,
            StatusCode::FileUnavailable => 550,
            StatusCode::InvalidFileName => 553,
            StatusCode::Other(code) => code,
        }
    }

    /// Check if the code indicates success (2xx or 3xx)
    pub fn is_success(self) -> bool {
        let code = self.code();
        (200..400).contains(&code)
    }
}

/// A complete FTP reply
///
/// Carries the terminal line's status code and message plus every received
/// line (continuation lines included, verbatim) in order.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Status code from the terminal line
    pub status: StatusCode,
    /// Message text of the terminal line
    pub message: String,
    /// All received lines in order, terminal line last
    pub lines: Vec<String>,
}

impl Reply {
    /// The numeric status code
    pub fn code(&self) -> u16 {
        self.status.code()
    }

    /// Check if the reply indicates success (2xx or 3xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Require one of the listed status codes, surfacing the server's
    /// message otherwise
    pub fn require(self, allowed: &[StatusCode]) -> Result<Reply> {
        if allowed.contains(&self.status) {
            Ok(self)
        } else {
            Err(FtpError::Protocol {
                code: self.code(),
                message: self.message,
            })
        }
    }

    /// Require any successful status code
    pub fn require_success(self) -> Result<Reply> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FtpError::Protocol {
                code: self.code(),
                message: self.message,
            })
        }
    }
}

/// Recognize a reply's terminal line: three ASCII digits followed by a
/// space and the message (or nothing at all)
///
/// Continuation lines (`211-...`, indented feature lines) do not match and
/// are accumulated by the reader until a terminal line arrives.
pub fn terminal_line(line: &str) -> Option<(u16, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_digit()
    {
        return None;
    }

    let code = line[0..3].parse::<u16>().ok()?;
    match bytes.len() {
        // Bare "DDD" with no message; lenient towards minimal servers
        3 => Some((code, "")),
        _ if bytes[3] == b' ' => Some((code, &line[4..])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_line_basic() {
        let (code, msg) = terminal_line("220 service ready").unwrap();
        assert_eq!(code, 220);
        assert_eq!(msg, "service ready");

        let (code, msg) = terminal_line("230 User logged in, proceed").unwrap();
        assert_eq!(code, 230);
        assert_eq!(msg, "User logged in, proceed");
    }

    #[test]
    fn test_terminal_line_continuations_rejected() {
        // Multi-line marker
        assert!(terminal_line("211-Features:").is_none());
        // Indented feature line
        assert!(terminal_line(" UTF8").is_none());
        // Free text
        assert!(terminal_line("hello world").is_none());
        assert!(terminal_line("").is_none());
        assert!(terminal_line("21").is_none());
    }

    #[test]
    fn test_terminal_line_bare_code() {
        let (code, msg) = terminal_line("200").unwrap();
        assert_eq!(code, 200);
        assert_eq!(msg, "");
    }

    #[test]
    fn test_terminal_line_empty_message() {
        let (code, msg) = terminal_line("226 ").unwrap();
        assert_eq!(code, 226);
        assert_eq!(msg, "");
    }

    #[test]
    fn test_status_round_trip() {
        for code in [125, 150, 200, 211, 213, 226, 227, 229, 230, 250, 257, 331, 350, 550] {
            assert_eq!(StatusCode::from_u16(code).code(), code);
        }
        assert_eq!(StatusCode::from_u16(234), StatusCode::Other(234));
        assert_eq!(StatusCode::Other(234).code(), 234);
    }

    #[test]
    fn test_success_boundaries() {
        assert!(!StatusCode::from_u16(199).is_success());
        assert!(StatusCode::from_u16(200).is_success());
        assert!(StatusCode::from_u16(350).is_success());
        assert!(StatusCode::from_u16(399).is_success());
        assert!(!StatusCode::from_u16(400).is_success());
        assert!(!StatusCode::from_u16(550).is_success());
    }

    #[test]
    fn test_require_allows_listed_codes() {
        let reply = Reply {
            status: StatusCode::OpeningData,
            message: "opening".to_string(),
            lines: vec!["150 opening".to_string()],
        };
        let reply = reply
            .require(&[StatusCode::DataAlreadyOpen, StatusCode::OpeningData])
            .unwrap();
        assert_eq!(reply.code(), 150);
    }

    #[test]
    fn test_require_surfaces_server_message() {
        let reply = Reply {
            status: StatusCode::FileUnavailable,
            message: "No such file".to_string(),
            lines: vec!["550 No such file".to_string()],
        };
        let err = reply.require(&[StatusCode::FileActionOk]).unwrap_err();
        match err {
            FtpError::Protocol { code, message } => {
                assert_eq!(code, 550);
                assert_eq!(message, "No such file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
