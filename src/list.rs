//! Directory listing parsers
//!
//! A LIST reply can be Unix `ls -l` style or DOS style depending on the
//! server; MLSD (RFC 3659) replies are machine-readable `key=value` facts.
//! Each LIST parser exposes `matches` (probe one sample line) and `parse`
//! (one line to one node). MLSD lines go through [`parse_mlsd_line`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};

/// The kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInformation {
    /// Entry name (embedded spaces preserved)
    pub name: String,
    /// Size in bytes (0 for directories when the listing carries none)
    pub size: u64,
    /// Modification timestamp, when the listing carries one
    pub modified: Option<NaiveDateTime>,
    /// File, directory or symlink
    pub kind: NodeKind,
    /// The listing line this entry was parsed from
    pub raw: String,
}

/// Skip `count` whitespace-separated tokens and return the rest of the line
///
/// This is how names keep their embedded spaces: the name is everything
/// after the last fixed-position token, not a token itself.
fn tail_after_tokens(line: &str, count: usize) -> Option<&str> {
    let mut rest = line;
    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        rest = &rest[end..];
    }
    let rest = rest.trim_start();
    if rest.is_empty() { None } else { Some(rest) }
}

/// Unix `ls -l` style listing lines
///
/// `perm links owner group size month day time-or-year name...`
pub mod unix {
    use super::*;

    /// Probe: Unix lines start with the entry type column (`-`, `d` or `l`)
    pub fn matches(line: &str) -> bool {
        matches!(line.as_bytes().first(), Some(b'-' | b'd' | b'l'))
    }

    /// Parse one Unix listing line
    pub fn parse(line: &str) -> Option<NodeInformation> {
        if !matches(line) {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 9 {
            return None;
        }

        let kind = match line.as_bytes()[0] {
            b'd' => NodeKind::Directory,
            b'l' => NodeKind::Symlink,
            _ => NodeKind::File,
        };
        let size = tokens[4].parse::<u64>().ok()?;
        let modified = parse_date(tokens[5], tokens[6], tokens[7]);

        let mut name = tail_after_tokens(line, 8)?.to_string();
        if kind == NodeKind::Symlink {
            if let Some(idx) = name.find(" -> ") {
                name.truncate(idx);
            }
        }

        Some(NodeInformation {
            name,
            size,
            modified,
            kind,
            raw: line.to_string(),
        })
    }

    /// `month day HH:MM` (current year) or `month day YYYY`
    fn parse_date(month: &str, day: &str, time_or_year: &str) -> Option<NaiveDateTime> {
        let month = match month.to_ascii_lowercase().as_str() {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        };
        let day: u32 = day.parse().ok()?;

        if let Some((hour, minute)) = time_or_year.split_once(':') {
            let hour: u32 = hour.parse().ok()?;
            let minute: u32 = minute.parse().ok()?;
            NaiveDate::from_ymd_opt(Utc::now().year(), month, day)?.and_hms_opt(hour, minute, 0)
        } else {
            let year: i32 = time_or_year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
        }
    }
}

/// DOS style listing lines
///
/// `MM-DD-YY  HH:MM(AM|PM)  <size-or-DIR>  name`
pub mod dos {
    use super::*;

    /// Probe: DOS lines open with the `MM-DD-YY` date column
    pub fn matches(line: &str) -> bool {
        let b = line.as_bytes();
        b.len() >= 8
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[2] == b'-'
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit()
            && b[5] == b'-'
            && b[6].is_ascii_digit()
            && b[7].is_ascii_digit()
    }

    /// Parse one DOS listing line
    pub fn parse(line: &str) -> Option<NodeInformation> {
        if !matches(line) {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return None;
        }

        let (kind, size) = if tokens[2].eq_ignore_ascii_case("<DIR>") {
            (NodeKind::Directory, 0)
        } else {
            (NodeKind::File, tokens[2].parse::<u64>().ok()?)
        };

        let stamp = format!("{} {}", tokens[0], tokens[1]);
        let modified = NaiveDateTime::parse_from_str(&stamp, "%m-%d-%y %I:%M%p").ok();

        let name = tail_after_tokens(line, 3)?.to_string();

        Some(NodeInformation {
            name,
            size,
            modified,
            kind,
            raw: line.to_string(),
        })
    }
}

/// Parse one MLSD line: `;`-separated facts, one space, then the name
///
/// Facts of interest: `type` (`file`, `dir`, `OS.unix=symlink`; `cdir` and
/// `pdir` entries yield `None`), `size` (decimal bytes) and `modify`
/// (`YYYYMMDDHHMMSS`).
pub fn parse_mlsd_line(line: &str) -> Option<NodeInformation> {
    let (facts, name) = line.split_once(' ')?;
    if name.is_empty() {
        return None;
    }

    let mut kind = NodeKind::File;
    let mut size = 0u64;
    let mut modified = None;

    for fact in facts.split(';').filter(|f| !f.is_empty()) {
        let Some((key, value)) = fact.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "type" => {
                if value.eq_ignore_ascii_case("dir") {
                    kind = NodeKind::Directory;
                } else if value.eq_ignore_ascii_case("cdir") || value.eq_ignore_ascii_case("pdir") {
                    // "." and ".." entries are not listing results
                    return None;
                } else if value.eq_ignore_ascii_case("OS.unix=symlink") {
                    kind = NodeKind::Symlink;
                } else {
                    kind = NodeKind::File;
                }
            }
            "size" => size = value.parse().unwrap_or(0),
            "modify" => modified = NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S").ok(),
            _ => {}
        }
    }

    Some(NodeInformation {
        name: name.to_string(),
        size,
        modified,
        kind,
        raw: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_matches() {
        assert!(unix::matches("-rw-r--r-- 1 u g 5 Jan 01 12:00 a.txt"));
        assert!(unix::matches("drwxr-xr-x 2 u g 4096 Jan 01 12:00 sub"));
        assert!(unix::matches("lrwxrwxrwx 1 u g 9 Jan 01 12:00 link -> target"));
        assert!(!unix::matches("01-01-24  12:00PM  5  a.txt"));
        assert!(!unix::matches("total 12"));
        assert!(!unix::matches(""));
    }

    #[test]
    fn test_unix_parse_file() {
        let line = "-rw-r--r--   1 owner   group        1234 Jun 15 09:42 report.pdf";
        let node = unix::parse(line).unwrap();
        assert_eq!(node.name, "report.pdf");
        assert_eq!(node.size, 1234);
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.raw, line);
        let modified = node.modified.unwrap();
        assert_eq!(modified.month(), 6);
        assert_eq!(modified.day(), 15);
        assert_eq!(modified.format("%H:%M").to_string(), "09:42");
    }

    #[test]
    fn test_unix_parse_name_with_spaces() {
        let line = "-rw-r--r-- 1 owner group 99 Mar 02 2023 annual report 2023.txt";
        let node = unix::parse(line).unwrap();
        assert_eq!(node.name, "annual report 2023.txt");
        assert_eq!(node.size, 99);
        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), 2023);
        assert_eq!(modified.month(), 3);
        assert_eq!(modified.day(), 2);
    }

    #[test]
    fn test_unix_parse_directory_and_symlink() {
        let dir = unix::parse("drwxr-xr-x 2 owner group 4096 Jan 05 08:00 sub").unwrap();
        assert_eq!(dir.kind, NodeKind::Directory);
        assert_eq!(dir.name, "sub");

        let link = unix::parse("lrwxrwxrwx 1 owner group 9 Jan 05 08:00 current -> v1.2").unwrap();
        assert_eq!(link.kind, NodeKind::Symlink);
        assert_eq!(link.name, "current");
    }

    #[test]
    fn test_unix_parse_rejects_short_lines() {
        assert!(unix::parse("-rw-r--r-- 1 owner group").is_none());
        assert!(unix::parse("total 4").is_none());
    }

    #[test]
    fn test_unix_round_trip() {
        let line = "-rw-r--r-- 1 owner group 512 Dec 24 2021 notes.txt";
        let node = unix::parse(line).unwrap();
        assert_eq!(unix::parse(&node.raw).unwrap(), node);
    }

    #[test]
    fn test_dos_matches() {
        assert!(dos::matches("01-23-24  03:45PM              1234 a.txt"));
        assert!(dos::matches("12-01-99  10:00AM       <DIR>      sub"));
        assert!(!dos::matches("-rw-r--r-- 1 u g 5 Jan 01 12:00 a.txt"));
        assert!(!dos::matches("1-2-24 bad"));
    }

    #[test]
    fn test_dos_parse_file() {
        let line = "01-23-24  03:45PM              1234 quarterly results.xlsx";
        let node = dos::parse(line).unwrap();
        assert_eq!(node.name, "quarterly results.xlsx");
        assert_eq!(node.size, 1234);
        assert_eq!(node.kind, NodeKind::File);
        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), 2024);
        assert_eq!(modified.month(), 1);
        assert_eq!(modified.day(), 23);
        assert_eq!(modified.format("%H:%M").to_string(), "15:45");
    }

    #[test]
    fn test_dos_parse_directory() {
        let node = dos::parse("12-01-99  10:00AM       <DIR>          archive").unwrap();
        assert_eq!(node.kind, NodeKind::Directory);
        assert_eq!(node.name, "archive");
        assert_eq!(node.size, 0);
        assert_eq!(node.modified.unwrap().year(), 1999);
    }

    #[test]
    fn test_mlsd_parse_file() {
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
    fn test_mlsd_parse_dir_and_symlink() {
        let dir = parse_mlsd_line("type=dir;modify=20240101120001; sub").unwrap();
        assert_eq!(dir.kind, NodeKind::Directory);
        assert_eq!(dir.name, "sub");
        assert_eq!(dir.size, 0);

        let link = parse_mlsd_line("type=OS.unix=symlink;size=4; latest").unwrap();
        assert_eq!(link.kind, NodeKind::Symlink);
        assert_eq!(link.name, "latest");
    }

    #[test]
    fn test_mlsd_skips_dot_entries() {
        assert!(parse_mlsd_line("type=cdir;modify=20240101120000; .").is_none());
        assert!(parse_mlsd_line("type=pdir;modify=20240101120000; ..").is_none());
    }

    #[test]
    fn test_mlsd_name_with_spaces() {
        let node = parse_mlsd_line("type=file;size=10; release notes.md").unwrap();
        assert_eq!(node.name, "release notes.md");
    }

    #[test]
    fn test_mlsd_capitalized_facts() {
        let node = parse_mlsd_line("Type=dir;Modify=20230505050505; Sub").unwrap();
        assert_eq!(node.kind, NodeKind::Directory);
        assert_eq!(node.name, "Sub");
    }

    #[test]
    fn test_mlsd_rejects_factless_lines() {
        assert!(parse_mlsd_line("no-facts-here").is_none());
    }
}
