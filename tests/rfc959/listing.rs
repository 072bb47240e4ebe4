//! Directory listing formats
//!
//! LIST output per common server conventions (Unix `ls -l` and DOS),
//! MLSD facts per RFC 3659 Section 7.

use ftp_rs::list::{dos, parse_mlsd_line, unix};
use ftp_rs::NodeKind;

#[test]
fn test_unix_probe_selects_format() {
    assert!(unix::matches("-rw-r--r-- 1 u g 5 Jan 01 12:00 a.txt"));
    assert!(unix::matches("drwxr-xr-x 2 u g 64 Jan 01 12:00 d"));
    assert!(unix::matches("lrwxrwxrwx 1 u g 3 Jan 01 12:00 l -> t"));
    assert!(!unix::matches("01-01-24  12:00PM  5  a.txt"));
    assert!(!unix::matches("total 8"));
}

#[test]
fn test_unix_fields() {
    let node = unix::parse("-rw-rw-r--  1 ftp  ftp  20480 Sep 03 2022 backup.tar").unwrap();
    assert_eq!(node.name, "backup.tar");
    assert_eq!(node.size, 20480);
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(
        node.modified.unwrap().format("%Y-%m-%d").to_string(),
        "2022-09-03"
    );
}

#[test]
fn test_unix_symlink_target_stripped() {
    let node = unix::parse("lrwxrwxrwx 1 ftp ftp 11 Feb 10 2020 stable -> release-1.0").unwrap();
    assert_eq!(node.kind, NodeKind::Symlink);
    assert_eq!(node.name, "stable");
}

#[test]
fn test_unix_round_trip_through_raw_line() {
    let line = "-rw-r--r-- 1 ftp ftp 321 Oct 31 2019 spooky file.txt";
    let node = unix::parse(line).unwrap();
    assert_eq!(node.raw, line);
    assert_eq!(unix::parse(&node.raw).unwrap(), node);
}

#[test]
fn test_dos_fields() {
    let node = dos::parse("06-15-24  09:05AM             2048 setup.exe").unwrap();
    assert_eq!(node.name, "setup.exe");
    assert_eq!(node.size, 2048);
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(
        node.modified.unwrap().format("%Y-%m-%d %H:%M").to_string(),
        "2024-06-15 09:05"
    );

    let node = dos::parse("06-15-24  09:05AM       <DIR>          tools").unwrap();
    assert_eq!(node.kind, NodeKind::Directory);
    assert_eq!(node.name, "tools");
    assert_eq!(node.size, 0);
}

#[test]
fn test_mlsd_facts() {
    let node = parse_mlsd_line("type=file;size=3;modify=20240101120000; a.txt").unwrap();
    assert_eq!(node.name, "a.txt");
    assert_eq!(node.size, 3);
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(
        node.modified.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-01-01 12:00:00"
    );
}

#[test]
fn test_mlsd_current_and_parent_entries_skipped() {
    assert!(parse_mlsd_line("type=cdir;modify=20240101120000; .").is_none());
    assert!(parse_mlsd_line("type=pdir;modify=20240101120000; ..").is_none());
}

#[test]
fn test_mlsd_symlink_type() {
    let node = parse_mlsd_line("type=OS.unix=symlink;size=7; latest").unwrap();
    assert_eq!(node.kind, NodeKind::Symlink);
    assert_eq!(node.name, "latest");
}
