//! RFC 959 Section 4.2 - Reply framing
//!
//! A reply ends with exactly one line of the form `DDD SP text`;
//! intermediary lines of a multi-line reply open with `DDD-` (or anything
//! else) and are accumulated verbatim.

use ftp_rs::terminal_line;

#[test]
fn test_terminal_line_single_reply() {
    let (code, message) = terminal_line("220 FTP server ready").unwrap();
    assert_eq!(code, 220);
    assert_eq!(message, "FTP server ready");
}

#[test]
fn test_terminal_line_multi_line_opener_is_not_terminal() {
    assert!(terminal_line("211-Features:").is_none());
    assert!(terminal_line("230-Welcome to the archive").is_none());
}

#[test]
fn test_terminal_line_indented_continuation_is_not_terminal() {
    assert!(terminal_line(" MLSD").is_none());
    assert!(terminal_line(" UTF8").is_none());
    assert!(terminal_line("  REST STREAM").is_none());
}

#[test]
fn test_terminal_line_requires_three_digits() {
    assert!(terminal_line("").is_none());
    assert!(terminal_line("2").is_none());
    assert!(terminal_line("22").is_none());
    assert!(terminal_line("2x0 nope").is_none());
    assert!(terminal_line("hello 200").is_none());
}

#[test]
fn test_terminal_line_code_without_message() {
    // Minimal servers occasionally send a bare code
    let (code, message) = terminal_line("200").unwrap();
    assert_eq!(code, 200);
    assert_eq!(message, "");
}

#[test]
fn test_terminal_line_preserves_message_verbatim() {
    let (code, message) =
        terminal_line("227 Entering Passive Mode (10,0,0,1,19,136)").unwrap();
    assert_eq!(code, 227);
    assert_eq!(message, "Entering Passive Mode (10,0,0,1,19,136)");
}
