//! Folder-name exclusion patterns.
//!
//! A pattern containing `*` matches the whole name with each `*` standing for
//! any (possibly empty) sequence of characters. A pattern without `*` matches
//! only the exact name. Both forms ignore case.

use log::debug;

pub const DEFAULT_EXCLUDE_LIST: &str = ".*,node_modules";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    Exact(String),
    Wildcard(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludePattern {
    source: String,
    matcher: Matcher,
}

impl ExcludePattern {
    /// Returns `None` for blank patterns.
    pub fn compile(pattern: &str) -> Option<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return None;
        }

        let lowered = trimmed.to_lowercase();
        let matcher = if lowered.contains('*') {
            Matcher::Wildcard(lowered.split('*').map(str::to_string).collect())
        } else {
            Matcher::Exact(lowered)
        };

        Some(Self {
            source: trimmed.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        match &self.matcher {
            Matcher::Exact(expected) => name == *expected,
            Matcher::Wildcard(parts) => matches_wildcard(&name, parts),
        }
    }
}

// `parts` always has at least two entries: the text before the first `*` and
// after the last one.
fn matches_wildcard(name: &str, parts: &[String]) -> bool {
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return name == first,
    };

    if name.len() < first.len() + last.len()
        || !name.starts_with(first.as_str())
        || !name.ends_with(last.as_str())
    {
        return false;
    }

    let mut remaining = &name[first.len()..name.len() - last.len()];
    for part in middle {
        match remaining.find(part.as_str()) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    true
}

/// Compiled, ordered pattern set.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .filter_map(|p| ExcludePattern::compile(p.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// First pattern that excludes `name`, if any.
    pub fn matching_pattern(&self, name: &str) -> Option<&ExcludePattern> {
        self.patterns.iter().find(|p| p.matches(name))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        match self.matching_pattern(name) {
            Some(pattern) => {
                debug!("Folder {} excluded by pattern {}", name, pattern.as_str());
                true
            }
            None => false,
        }
    }
}
