//! Name-based rules with `*` / `?` wildcards.

use interpose_core::{BoxError, MatchingRule, MethodDescriptor};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Error building a wildcard pattern.
#[derive(Error, Debug)]
#[error("invalid wildcard pattern `{pattern}`")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

/// A compiled wildcard pattern: `*` matches any run, `?` any single character.
#[derive(Debug, Clone)]
pub struct Wildcard {
    pattern: String,
    regex: Regex,
}

impl Wildcard {
    /// Compile `pattern`.
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self, PatternError> {
        let escaped = regex::escape(pattern)
            .replace(r"\*", ".*")
            .replace(r"\?", ".");
        let regex = RegexBuilder::new(&format!("^{escaped}$"))
            .case_insensitive(ignore_case)
            .build()
            .map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether `text` matches the whole pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Matches methods whose name matches any of the given wildcard patterns.
#[derive(Debug, Clone)]
pub struct MemberNameRule {
    patterns: Vec<Wildcard>,
}

impl MemberNameRule {
    /// Case-sensitive rule for a single pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::any([pattern], false)
    }

    /// Rule matching any of `patterns`.
    pub fn any<'a>(
        patterns: impl IntoIterator<Item = &'a str>,
        ignore_case: bool,
    ) -> Result<Self, PatternError> {
        let patterns = patterns
            .into_iter()
            .map(|p| Wildcard::new(p, ignore_case))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl MatchingRule for MemberNameRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(self.patterns.iter().any(|p| p.is_match(method.name())))
    }

    fn name(&self) -> &str {
        "member-name"
    }
}

/// Matches methods declared by a type whose name matches a wildcard pattern.
#[derive(Debug, Clone)]
pub struct DeclaringTypeRule {
    pattern: Wildcard,
}

impl DeclaringTypeRule {
    /// Case-sensitive rule for `pattern`.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: Wildcard::new(pattern, false)?,
        })
    }
}

impl MatchingRule for DeclaringTypeRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(self.pattern.is_match(method.declaring_type()))
    }

    fn name(&self) -> &str {
        "declaring-type"
    }
}
