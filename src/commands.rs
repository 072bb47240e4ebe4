//! FTP command envelopes and wire serialization

use std::fmt;

/// An FTP command with its argument
///
/// Serialization is `VERB` or `VERB SP ARG`, CRLF-terminated, via
/// [`FtpCommand::to_wire`]. The `Display` impl is the log-safe form: no
/// CRLF, and the `PASS` argument redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FtpCommand {
    /// USER - submit login name
    User(String),
    /// PASS - submit password
    Pass(String),
    /// AUTH TLS - request explicit TLS upgrade
    AuthTls,
    /// PBSZ - protection buffer size (always "0" for TLS)
    Pbsz(String),
    /// PROT - data channel protection level ("P" for private)
    Prot(String),
    /// FEAT - list server extensions
    Feat,
    /// PWD - print working directory
    Pwd,
    /// CWD - change working directory
    Cwd(String),
    /// MKD - make directory
    Mkd(String),
    /// RMD - remove directory
    Rmd(String),
    /// DELE - delete file
    Dele(String),
    /// RNFR - rename from
    Rnfr(String),
    /// RNTO - rename to
    Rnto(String),
    /// SIZE - file size in bytes
    Size(String),
    /// TYPE - transfer type ("A", "I", optionally with a second character)
    Type(String),
    /// PASV - enter passive mode
    Pasv,
    /// EPSV - enter extended passive mode
    Epsv,
    /// PORT - active mode endpoint ("h1,h2,h3,h4,p1,p2")
    Port(String),
    /// MLSD - machine-readable directory listing
    Mlsd,
    /// LIST - human-readable directory listing
    List,
    /// RETR - retrieve file
    Retr(String),
    /// STOR - store file
    Stor(String),
    /// QUIT - end session
    Quit,
    /// CLNT - announce client name
    Clnt(String),
    /// OPTS - set option (e.g. "UTF8 ON")
    Opts(String),
}

impl FtpCommand {
    /// The command verb as sent on the wire
    pub fn verb(&self) -> &'static str {
        match self {
            FtpCommand::User(_) => "USER",
            FtpCommand::Pass(_) => "PASS",
            FtpCommand::AuthTls => "AUTH",
            FtpCommand::Pbsz(_) => "PBSZ",
            FtpCommand::Prot(_) => "PROT",
            FtpCommand::Feat => "FEAT",
            FtpCommand::Pwd => "PWD",
            FtpCommand::Cwd(_) => "CWD",
            FtpCommand::Mkd(_) => "MKD",
            FtpCommand::Rmd(_) => "RMD",
            FtpCommand::Dele(_) => "DELE",
            FtpCommand::Rnfr(_) => "RNFR",
            FtpCommand::Rnto(_) => "RNTO",
            FtpCommand::Size(_) => "SIZE",
            FtpCommand::Type(_) => "TYPE",
            FtpCommand::Pasv => "PASV",
            FtpCommand::Epsv => "EPSV",
            FtpCommand::Port(_) => "PORT",
            FtpCommand::Mlsd => "MLSD",
            FtpCommand::List => "LIST",
            FtpCommand::Retr(_) => "RETR",
            FtpCommand::Stor(_) => "STOR",
            FtpCommand::Quit => "QUIT",
            FtpCommand::Clnt(_) => "CLNT",
            FtpCommand::Opts(_) => "OPTS",
        }
    }

    /// The argument string, if the command carries one
    pub fn argument(&self) -> Option<&str> {
        match self {
            FtpCommand::User(arg)
            | FtpCommand::Pass(arg)
            | FtpCommand::Pbsz(arg)
            | FtpCommand::Prot(arg)
            | FtpCommand::Cwd(arg)
            | FtpCommand::Mkd(arg)
            | FtpCommand::Rmd(arg)
            | FtpCommand::Dele(arg)
            | FtpCommand::Rnfr(arg)
            | FtpCommand::Rnto(arg)
            | FtpCommand::Size(arg)
            | FtpCommand::Type(arg)
            | FtpCommand::Port(arg)
            | FtpCommand::Retr(arg)
            | FtpCommand::Stor(arg)
            | FtpCommand::Clnt(arg)
            | FtpCommand::Opts(arg) => Some(arg),
            FtpCommand::AuthTls => Some("TLS"),
            FtpCommand::Feat
            | FtpCommand::Pwd
            | FtpCommand::Pasv
            | FtpCommand::Epsv
            | FtpCommand::Mlsd
            | FtpCommand::List
            | FtpCommand::Quit => None,
        }
    }

    /// Serialize as `VERB [SP ARG] CRLF` for transmission
    ///
    /// An empty argument still gets its separating space (`PASS ` for an
    /// anonymous password), matching what servers expect.
    pub fn to_wire(&self) -> String {
        match self.argument() {
            Some(arg) => format!("{} {}\r\n", self.verb(), arg),
            None => format!("{}\r\n", self.verb()),
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpCommand::Pass(_) => write!(f, "PASS ******"),
            other => match other.argument() {
                Some(arg) => write!(f, "{} {}", other.verb(), arg),
                None => write!(f, "{}", other.verb()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_with_argument() {
        assert_eq!(
            FtpCommand::User("anonymous".into()).to_wire(),
            "USER anonymous\r\n"
        );
        assert_eq!(FtpCommand::Cwd("/pub".into()).to_wire(), "CWD /pub\r\n");
        assert_eq!(
            FtpCommand::Retr("a.txt".into()).to_wire(),
            "RETR a.txt\r\n"
        );
        assert_eq!(
            FtpCommand::Port("127,0,0,1,19,136".into()).to_wire(),
            "PORT 127,0,0,1,19,136\r\n"
        );
        assert_eq!(FtpCommand::AuthTls.to_wire(), "AUTH TLS\r\n");
        assert_eq!(FtpCommand::Opts("UTF8 ON".into()).to_wire(), "OPTS UTF8 ON\r\n");
    }

    #[test]
    fn test_wire_without_argument() {
        assert_eq!(FtpCommand::Feat.to_wire(), "FEAT\r\n");
        assert_eq!(FtpCommand::Pwd.to_wire(), "PWD\r\n");
        assert_eq!(FtpCommand::Epsv.to_wire(), "EPSV\r\n");
        assert_eq!(FtpCommand::Quit.to_wire(), "QUIT\r\n");
        assert_eq!(FtpCommand::Mlsd.to_wire(), "MLSD\r\n");
    }

    #[test]
    fn test_wire_empty_argument_keeps_space() {
        // Anonymous logins send "PASS " with an empty password
        assert_eq!(FtpCommand::Pass(String::new()).to_wire(), "PASS \r\n");
    }

    #[test]
    fn test_type_without_second_char() {
        // "TYPE I" with no trailing space when there is no second type character
        assert_eq!(FtpCommand::Type("I".into()).to_wire(), "TYPE I\r\n");
        assert_eq!(FtpCommand::Type("A N".into()).to_wire(), "TYPE A N\r\n");
    }

    #[test]
    fn test_display_redacts_password() {
        let cmd = FtpCommand::Pass("hunter2".into());
        assert_eq!(cmd.to_string(), "PASS ******");
        // The wire form is untouched
        assert_eq!(cmd.to_wire(), "PASS hunter2\r\n");
    }

    #[test]
    fn test_display_plain_commands() {
        assert_eq!(FtpCommand::User("bob".into()).to_string(), "USER bob");
        assert_eq!(FtpCommand::Feat.to_string(), "FEAT");
        assert_eq!(FtpCommand::AuthTls.to_string(), "AUTH TLS");
    }
}
