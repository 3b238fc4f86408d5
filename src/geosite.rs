//! Resolution of geosite references against an on-disk domain-list data set.
//!
//! A geosite reference names a record file (one per base name) and may carry
//! an attribute filter (`google@cn`, `google@!cn`). Resolution reads the file
//! at call time so that external refreshes of the data set are visible on the
//! next call; nothing is cached across calls.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::types::{MatchKind, MatchRecord};

/// Tag-based line filter applied while resolving a domain-list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrFilter {
    /// Accept only lines tagged with the attribute (`@cn`).
    Require(String),
    /// Accept only lines not tagged with the attribute (`@!cn`).
    Forbid(String),
}

impl AttrFilter {
    fn parse(raw: &str) -> AttrFilter {
        match raw.strip_prefix('!') {
            Some(tag) => AttrFilter::Forbid(tag.to_owned()),
            None => AttrFilter::Require(raw.to_owned()),
        }
    }

    fn accepts(&self, tags: &[&str]) -> bool {
        match self {
            AttrFilter::Require(tag) => tags.contains(&tag.as_str()),
            AttrFilter::Forbid(tag) => !tags.contains(&tag.as_str()),
        }
    }
}

/// A geosite reference split into base name and optional attribute filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeositeRef {
    pub name: String,
    pub filter: Option<AttrFilter>,
}

impl GeositeRef {
    /// Split a reference like `google` or `google@cn` on the `@` qualifier.
    #[must_use]
    pub fn parse(reference: &str) -> GeositeRef {
        match reference.split_once('@') {
            Some((name, attr)) => GeositeRef {
                name: name.to_owned(),
                filter: Some(AttrFilter::parse(attr)),
            },
            None => GeositeRef {
                name: reference.to_owned(),
                filter: None,
            },
        }
    }
}

/// Read-only view over a directory of domain-list record files.
#[derive(Debug, Clone)]
pub struct GeositeDb {
    root: PathBuf,
}

impl GeositeDb {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a reference into its ordered match records.
    ///
    /// Records accumulate in file order across `include:` directives, without
    /// deduplication. Fails soft: a missing or unreadable file logs a warning
    /// and contributes no records.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Vec<MatchRecord> {
        let geosite = GeositeRef::parse(reference);
        let mut visited = HashSet::new();
        let mut records = Vec::new();
        self.resolve_file(&geosite.name, geosite.filter.as_ref(), &mut visited, &mut records);
        records
    }

    /// Render a resolved reference as plain `TYPE,pattern` lines, one per
    /// record, for hosting as a remote rule list. `None` when the reference
    /// resolves to no records (the serving layer's not-found case).
    #[must_use]
    pub fn render_list(&self, reference: &str) -> Option<String> {
        let records = self.resolve(reference);
        if records.is_empty() {
            return None;
        }
        let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
        Some(lines.join("\n"))
    }

    fn resolve_file(
        &self,
        name: &str,
        filter: Option<&AttrFilter>,
        visited: &mut HashSet<String>,
        out: &mut Vec<MatchRecord>,
    ) {
        // The guard is keyed by base name alone, so a file re-included under
        // a different attribute filter within one call is skipped.
        if !visited.insert(name.to_owned()) {
            return;
        }

        let path = self.root.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("geosite list {} unreadable: {err}", path.display());
                return;
            }
        };

        for line in content.lines() {
            // Strip trailing comments, then blank lines.
            let clean = line.split('#').next().unwrap_or_default().trim();
            if clean.is_empty() {
                continue;
            }

            let mut parts = clean.split_whitespace();
            let Some(primary) = parts.next() else { continue };
            let tags: Vec<&str> = parts.map(|tag| tag.trim_start_matches('@')).collect();

            if let Some(filter) = filter {
                if !filter.accepts(&tags) {
                    continue;
                }
            }

            if let Some(include) = primary.strip_prefix("include:") {
                self.resolve_file(include, filter, visited, out);
                continue;
            }

            if let Some(record) = classify(primary) {
                out.push(record);
            }
        }
    }
}

/// Classify a primary spec token by prefix and strip the prefix. A bare token
/// is a domain suffix. Prefix-only tokens carry no pattern and yield nothing.
fn classify(spec: &str) -> Option<MatchRecord> {
    let (kind, pattern) = if let Some(pattern) = spec.strip_prefix("full:") {
        (MatchKind::Exact, pattern.to_owned())
    } else if let Some(pattern) = spec.strip_prefix("domain:") {
        (MatchKind::Suffix, pattern.to_owned())
    } else if let Some(pattern) = spec.strip_prefix("keyword:") {
        (MatchKind::Keyword, pattern.to_owned())
    } else if let Some(pattern) = spec.strip_prefix("regexp:") {
        (MatchKind::UrlRegex, rewrite_regex(pattern))
    } else {
        (MatchKind::Suffix, spec.to_owned())
    };

    if pattern.is_empty() {
        return None;
    }
    Some(MatchRecord { kind, pattern })
}

/// Rewrite a domain-anchored regular expression into a URL-anchored one:
/// a leading `^` becomes `^https?://` and a trailing `$` becomes an
/// optional-port-then-path boundary.
fn rewrite_regex(pattern: &str) -> String {
    let mut rewritten = match pattern.strip_prefix('^') {
        Some(rest) => format!("^https?://{rest}"),
        None => pattern.to_owned(),
    };
    if let Some(rest) = rewritten.strip_suffix('$') {
        rewritten = format!("{rest}(:[0-9]+)?(/|$)");
    }
    rewritten
}
