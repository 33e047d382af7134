//! # Matching rules
//!
//! A matching rule is a predicate over a [`MethodDescriptor`] deciding whether
//! a policy's handlers apply to a method.
//!
//! Rules must be pure functions of the descriptor: the pipeline cache stores
//! the outcome per method and never asks again. A rule that fails returns
//! `Err`; the framework reports that as a configuration error, not as a
//! runtime call error.

use crate::{error::BoxError, method::MethodDescriptor};

/// A predicate deciding whether a policy applies to a method.
///
/// Closures `Fn(&MethodDescriptor) -> bool` are rules too.
///
/// # Example
///
/// ```rust
/// use interpose_core::{MatchingRule, MethodDescriptor};
///
/// let rule = |m: &MethodDescriptor| m.name().starts_with("get_");
/// let method = MethodDescriptor::builder("Repo", "get_user").build();
/// assert!(rule.matches(&method).unwrap());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `MatchingRule`",
    label = "missing `MatchingRule` implementation",
    note = "Rules implement `matches(&MethodDescriptor) -> Result<bool, BoxError>`, or are closures `Fn(&MethodDescriptor) -> bool`."
)]
pub trait MatchingRule: Send + Sync + 'static {
    /// Whether the rule selects `method`.
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> MatchingRule for F
where
    F: Fn(&MethodDescriptor) -> bool + Send + Sync + 'static,
{
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok((self)(method))
    }

    fn name(&self) -> &str {
        "closure"
    }
}
