//! FEAT feature-set storage and lookup
//!
//! The FEAT command returns one extension per line between the `211-` and
//! `211` frame. Servers disagree about capitalization and argument syntax
//! (`MLST type*;size*;modify*;`), so lookups are case-insensitive substring
//! matches against the stored lines.

/// Extensions advertised by an FTP server via FEAT
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    lines: Vec<String>,
}

impl FeatureSet {
    /// Create an empty feature set (server without FEAT support)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a feature set from the lines of a FEAT reply
    ///
    /// Lines are trimmed and kept verbatim; empty lines are dropped. The
    /// framing lines (`211-Features:`, `211 End`) may be included, they do
    /// not disturb lookups.
    pub fn from_reply_lines(lines: &[String]) -> Self {
        let lines = lines
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    /// Check whether any feature line contains `feature`, case-insensitively
    pub fn supports(&self, feature: &str) -> bool {
        let needle = feature.to_ascii_uppercase();
        self.lines
            .iter()
            .any(|line| line.to_ascii_uppercase().contains(&needle))
    }

    /// The stored feature lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the server advertised nothing
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_supports_trimmed_lines() {
        let feats = FeatureSet::from_reply_lines(&lines(&[" UTF8", " MLSD", " SIZE"]));
        assert!(feats.supports("UTF8"));
        assert!(feats.supports("MLSD"));
        assert!(feats.supports("SIZE"));
        assert!(!feats.supports("REST"));
    }

    #[test]
    fn test_supports_case_insensitive() {
        let feats = FeatureSet::from_reply_lines(&lines(&[" mlsd", " utf8"]));
        assert!(feats.supports("MLSD"));
        assert!(feats.supports("Utf8"));
    }

    #[test]
    fn test_supports_substring_with_arguments() {
        let feats = FeatureSet::from_reply_lines(&lines(&[" MLST type*;size*;modify*;"]));
        assert!(feats.supports("MLST"));
    }

    #[test]
    fn test_empty_set() {
        let feats = FeatureSet::empty();
        assert!(feats.is_empty());
        assert!(!feats.supports("MLSD"));
    }

    #[test]
    fn test_blank_lines_dropped() {
        let feats = FeatureSet::from_reply_lines(&lines(&["", " UTF8", "  "]));
        assert_eq!(feats.lines().len(), 1);
        assert_eq!(feats.lines()[0], "UTF8");
    }
}
