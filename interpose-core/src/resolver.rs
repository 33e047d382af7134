//! Named-instance resolution.
//!
//! Policies may refer to rules and handlers by name, and interception may
//! name its interceptor and behaviors. Turning a name into an instance (and deciding its
//! lifetime) is the job of an external resolution collaborator, seen here
//! only through the [`Resolver`] trait.

use crate::{
    behavior::InterceptionBehavior, handler::CallHandler, interceptor::Interceptor,
    rule::MatchingRule,
};
use std::sync::Arc;

/// Looks up rule, handler, interceptor and behavior instances by name.
pub trait Resolver: Send + Sync {
    /// Resolve a matching rule.
    fn resolve_rule(&self, name: &str) -> Option<Arc<dyn MatchingRule>>;

    /// Resolve a call handler.
    fn resolve_handler(&self, name: &str) -> Option<Arc<dyn CallHandler>>;

    /// Resolve an interceptor.
    fn resolve_interceptor(&self, _name: &str) -> Option<Arc<dyn Interceptor>> {
        None
    }

    /// Resolve an interception behavior.
    fn resolve_behavior(&self, _name: &str) -> Option<Arc<dyn InterceptionBehavior>> {
        None
    }
}

/// A resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve_rule(&self, _name: &str) -> Option<Arc<dyn MatchingRule>> {
        None
    }

    fn resolve_handler(&self, _name: &str) -> Option<Arc<dyn CallHandler>> {
        None
    }
}
