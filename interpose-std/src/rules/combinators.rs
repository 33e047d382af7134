//! Rule combinators.

use interpose_core::{BoxError, MatchingRule, MethodDescriptor};
use std::sync::Arc;

/// Matches every method.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl MatchingRule for Always {
    fn matches(&self, _method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "always"
    }
}

/// Matches no method.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl MatchingRule for Never {
    fn matches(&self, _method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "never"
    }
}

/// Matches when every inner rule matches. Short-circuits on the first miss.
#[derive(Clone, Default)]
pub struct AllOf {
    rules: Vec<Arc<dyn MatchingRule>>,
}

impl AllOf {
    /// Create an empty conjunction (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn and(mut self, rule: impl MatchingRule) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }
}

impl MatchingRule for AllOf {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        for rule in &self.rules {
            if !rule.matches(method)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn name(&self) -> &str {
        "all-of"
    }
}

/// Matches when any inner rule matches. Short-circuits on the first hit.
#[derive(Clone, Default)]
pub struct AnyOf {
    rules: Vec<Arc<dyn MatchingRule>>,
}

impl AnyOf {
    /// Create an empty disjunction (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn or(mut self, rule: impl MatchingRule) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }
}

impl MatchingRule for AnyOf {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        for rule in &self.rules {
            if rule.matches(method)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn name(&self) -> &str {
        "any-of"
    }
}

/// Inverts a rule.
#[derive(Debug, Clone)]
pub struct Not<R>(pub R);

impl<R: MatchingRule> MatchingRule for Not<R> {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(!self.0.matches(method)?)
    }

    fn name(&self) -> &str {
        "not"
    }
}
