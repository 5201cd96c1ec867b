//! Pattern matching for statement Action and Resource fields
//!
//! Only the whole-field wildcard is supported:
//! - `"*"` matches any requested value
//! - a list matches when the requested value is one of its entries (an entry
//!   of `"*"` also matches anything)
//! - a single string matches by exact, case-sensitive equality
//!
//! Partial wildcards such as `team:*` or `read*` are NOT globbed. They are
//! compared literally, so they only match a request for that exact string.
//! [`Policy::validate`](super::Policy::validate) reports them so authors notice.

use serde::{Deserialize, Serialize};

/// The wildcard token
pub const WILDCARD: &str = "*";

/// Action or Resource field of a statement: a single pattern or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSet {
    One(String),
    Many(Vec<String>),
}

impl PatternSet {
    /// The `"*"` pattern
    pub fn any() -> Self {
        PatternSet::One(WILDCARD.to_string())
    }

    /// Iterate over the individual patterns
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            PatternSet::One(pattern) => std::slice::from_ref(pattern),
            PatternSet::Many(patterns) => patterns,
        };
        slice.iter().map(String::as_str)
    }

    /// True when the field contains no patterns at all (`[]`)
    pub fn is_empty(&self) -> bool {
        matches!(self, PatternSet::Many(patterns) if patterns.is_empty())
    }

    /// Check whether a requested action or resource matches this field
    pub fn matches(&self, requested: &str) -> bool {
        PatternMatcher::matches(self, requested)
    }
}

impl From<&str> for PatternSet {
    fn from(pattern: &str) -> Self {
        PatternSet::One(pattern.to_string())
    }
}

impl From<String> for PatternSet {
    fn from(pattern: String) -> Self {
        PatternSet::One(pattern)
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(patterns: Vec<String>) -> Self {
        PatternSet::Many(patterns)
    }
}

impl From<Vec<&str>> for PatternSet {
    fn from(patterns: Vec<&str>) -> Self {
        PatternSet::Many(patterns.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PatternSet {
    fn from(patterns: [&str; N]) -> Self {
        PatternSet::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

/// Matcher for statement Action/Resource fields
pub struct PatternMatcher;

impl PatternMatcher {
    /// Check if a requested value matches a pattern field
    ///
    /// # Examples
    /// ```
    /// use abac_policy::iam::{PatternMatcher, PatternSet};
    ///
    /// assert!(PatternMatcher::matches(&PatternSet::any(), "delete"));
    /// assert!(PatternMatcher::matches(&PatternSet::from(["read", "list"]), "list"));
    /// assert!(!PatternMatcher::matches(&PatternSet::from("read"), "write"));
    /// ```
    pub fn matches(field: &PatternSet, requested: &str) -> bool {
        match field {
            PatternSet::One(pattern) => Self::matches_one(pattern, requested),
            PatternSet::Many(patterns) => patterns.iter().any(|p| Self::matches_one(p, requested)),
        }
    }

    fn matches_one(pattern: &str, requested: &str) -> bool {
        pattern == WILDCARD || pattern == requested
    }

    /// A pattern with a `*` somewhere other than as the whole field
    ///
    /// Such patterns are legal but behave as literals.
    pub fn is_partial_wildcard(pattern: &str) -> bool {
        pattern != WILDCARD && pattern.contains('*')
    }
}
