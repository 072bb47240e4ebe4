//! RFC 959 Section 4.1 - Command serialization
//!
//! Commands are `VERB` or `VERB SP ARG`, CRLF-terminated.

use ftp_rs::FtpCommand;

#[test]
fn test_access_control_commands() {
    assert_eq!(
        FtpCommand::User("anonymous".into()).to_wire(),
        "USER anonymous\r\n"
    );
    assert_eq!(FtpCommand::Pass("pw".into()).to_wire(), "PASS pw\r\n");
    assert_eq!(FtpCommand::Cwd("/pub".into()).to_wire(), "CWD /pub\r\n");
    assert_eq!(FtpCommand::Quit.to_wire(), "QUIT\r\n");
}

#[test]
fn test_transfer_parameter_commands() {
    assert_eq!(FtpCommand::Type("I".into()).to_wire(), "TYPE I\r\n");
    assert_eq!(FtpCommand::Pasv.to_wire(), "PASV\r\n");
    assert_eq!(FtpCommand::Epsv.to_wire(), "EPSV\r\n");
    assert_eq!(
        FtpCommand::Port("10,0,0,1,19,136".into()).to_wire(),
        "PORT 10,0,0,1,19,136\r\n"
    );
}

#[test]
fn test_service_commands() {
    assert_eq!(FtpCommand::Retr("a.txt".into()).to_wire(), "RETR a.txt\r\n");
    assert_eq!(FtpCommand::Stor("b.bin".into()).to_wire(), "STOR b.bin\r\n");
    assert_eq!(FtpCommand::Dele("old".into()).to_wire(), "DELE old\r\n");
    assert_eq!(FtpCommand::Mkd("new".into()).to_wire(), "MKD new\r\n");
    assert_eq!(FtpCommand::Rmd("gone".into()).to_wire(), "RMD gone\r\n");
    assert_eq!(FtpCommand::Rnfr("from".into()).to_wire(), "RNFR from\r\n");
    assert_eq!(FtpCommand::Rnto("to".into()).to_wire(), "RNTO to\r\n");
    assert_eq!(FtpCommand::List.to_wire(), "LIST\r\n");
    assert_eq!(FtpCommand::Mlsd.to_wire(), "MLSD\r\n");
}

#[test]
fn test_extension_commands() {
    assert_eq!(FtpCommand::Feat.to_wire(), "FEAT\r\n");
    assert_eq!(FtpCommand::AuthTls.to_wire(), "AUTH TLS\r\n");
    assert_eq!(FtpCommand::Pbsz("0".into()).to_wire(), "PBSZ 0\r\n");
    assert_eq!(FtpCommand::Prot("P".into()).to_wire(), "PROT P\r\n");
    assert_eq!(
        FtpCommand::Opts("UTF8 ON".into()).to_wire(),
        "OPTS UTF8 ON\r\n"
    );
    assert_eq!(FtpCommand::Clnt("ftp-rs".into()).to_wire(), "CLNT ftp-rs\r\n");
    assert_eq!(FtpCommand::Size("a.txt".into()).to_wire(), "SIZE a.txt\r\n");
}

#[test]
fn test_arguments_with_spaces_pass_through() {
    assert_eq!(
        FtpCommand::Retr("annual report.pdf".into()).to_wire(),
        "RETR annual report.pdf\r\n"
    );
    assert_eq!(
        FtpCommand::Cwd("dir with spaces".into()).to_wire(),
        "CWD dir with spaces\r\n"
    );
}

#[test]
fn test_password_redaction_in_display() {
    let cmd = FtpCommand::Pass("correct horse".into());
    assert_eq!(cmd.to_string(), "PASS ******");
    assert!(!format!("{cmd}").contains("correct horse"));
}
