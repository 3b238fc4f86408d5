use std::fmt;

/// How a resolved domain-list entry matches traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Suffix,
    Keyword,
    UrlRegex,
}

impl MatchKind {
    /// The Loon rule type this record renders as.
    #[must_use]
    pub fn as_rule_type(self) -> &'static str {
        match self {
            MatchKind::Exact => "DOMAIN",
            MatchKind::Suffix => "DOMAIN-SUFFIX",
            MatchKind::Keyword => "DOMAIN-KEYWORD",
            MatchKind::UrlRegex => "URL-REGEX",
        }
    }
}

/// One concrete match rule produced by resolving a geosite reference.
/// The pattern is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub kind: MatchKind,
    pub pattern: String,
}

impl MatchRecord {
    #[must_use]
    pub fn new(kind: MatchKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.kind.as_rule_type(), self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_type_names() {
        assert_eq!(MatchKind::Exact.as_rule_type(), "DOMAIN");
        assert_eq!(MatchKind::Suffix.as_rule_type(), "DOMAIN-SUFFIX");
        assert_eq!(MatchKind::Keyword.as_rule_type(), "DOMAIN-KEYWORD");
        assert_eq!(MatchKind::UrlRegex.as_rule_type(), "URL-REGEX");
    }

    #[test]
    fn record_display_is_rule_line() {
        let record = MatchRecord::new(MatchKind::Suffix, "google.com");
        assert_eq!(record.to_string(), "DOMAIN-SUFFIX,google.com");
    }
}
