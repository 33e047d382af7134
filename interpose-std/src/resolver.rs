//! Map-backed resolver.

use interpose_core::{CallHandler, InterceptionBehavior, Interceptor, MatchingRule, Resolver};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

/// Error registering a named instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The name is already taken.
    #[error("{kind} already registered as `{name}`")]
    Duplicate {
        /// `"rule"`, `"handler"`, `"interceptor"` or `"behavior"`.
        kind: &'static str,
        /// The duplicated name.
        name: String,
    },
}

/// A [`Resolver`] over instances registered up front.
///
/// Every lookup returns the same shared instance, so handler state (e.g. a
/// call counter) is observed by everyone holding the name.
#[derive(Default)]
pub struct StaticResolver {
    rules: HashMap<String, Arc<dyn MatchingRule>>,
    handlers: HashMap<String, Arc<dyn CallHandler>>,
    interceptors: HashMap<String, Arc<dyn Interceptor>>,
    behaviors: HashMap<String, Arc<dyn InterceptionBehavior>>,
}

fn insert_unique<V>(
    map: &mut HashMap<String, V>,
    kind: &'static str,
    name: impl Into<String>,
    value: V,
) -> Result<(), ResolverError> {
    let name = name.into();
    if map.contains_key(&name) {
        return Err(ResolverError::Duplicate { kind, name });
    }
    map.insert(name, value);
    Ok(())
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a matching rule.
    pub fn insert_rule(
        &mut self,
        name: impl Into<String>,
        rule: impl MatchingRule,
    ) -> Result<(), ResolverError> {
        let rule: Arc<dyn MatchingRule> = Arc::new(rule);
        insert_unique(&mut self.rules, "rule", name, rule)
    }

    /// Register a call handler.
    pub fn insert_handler(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CallHandler>,
    ) -> Result<(), ResolverError> {
        insert_unique(&mut self.handlers, "handler", name, handler)
    }

    /// Register an interceptor.
    pub fn insert_interceptor(
        &mut self,
        name: impl Into<String>,
        interceptor: impl Interceptor,
    ) -> Result<(), ResolverError> {
        let interceptor: Arc<dyn Interceptor> = Arc::new(interceptor);
        insert_unique(&mut self.interceptors, "interceptor", name, interceptor)
    }

    /// Register an interception behavior, shared by every proxy naming it.
    pub fn insert_behavior(
        &mut self,
        name: impl Into<String>,
        behavior: Arc<dyn InterceptionBehavior>,
    ) -> Result<(), ResolverError> {
        insert_unique(&mut self.behaviors, "behavior", name, behavior)
    }
}

impl Resolver for StaticResolver {
    fn resolve_rule(&self, name: &str) -> Option<Arc<dyn MatchingRule>> {
        self.rules.get(name).cloned()
    }

    fn resolve_handler(&self, name: &str) -> Option<Arc<dyn CallHandler>> {
        self.handlers.get(name).cloned()
    }

    fn resolve_interceptor(&self, name: &str) -> Option<Arc<dyn Interceptor>> {
        self.interceptors.get(name).cloned()
    }

    fn resolve_behavior(&self, name: &str) -> Option<Arc<dyn InterceptionBehavior>> {
        self.behaviors.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rules::Always,
        testing::{CountingHandler, RecordingBehavior},
    };
    use interpose_core::ContractInterceptor;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut resolver = StaticResolver::new();
        resolver.insert_rule("rule1", Always).unwrap();
        assert_eq!(
            resolver.insert_rule("rule1", Always).unwrap_err(),
            ResolverError::Duplicate {
                kind: "rule",
                name: "rule1".into()
            }
        );
    }

    #[test]
    fn lookups_share_one_instance() {
        let mut resolver = StaticResolver::new();
        let handler = Arc::new(CountingHandler::new());
        resolver.insert_handler("handler1", handler.clone()).unwrap();
        resolver
            .insert_interceptor("contract", ContractInterceptor)
            .unwrap();

        let resolved = resolver.resolve_handler("handler1").unwrap();
        assert_eq!(Arc::strong_count(&handler), 3);
        drop(resolved);
        assert!(resolver.resolve_handler("handler2").is_none());
        assert!(resolver.resolve_interceptor("contract").is_some());
        assert!(resolver.resolve_rule("missing").is_none());
    }

    #[test]
    fn behaviors_resolve_by_name() {
        let mut resolver = StaticResolver::new();
        resolver
            .insert_behavior("recording", Arc::new(RecordingBehavior::new()))
            .unwrap();
        assert_eq!(
            resolver
                .insert_behavior("recording", Arc::new(RecordingBehavior::new()))
                .unwrap_err(),
            ResolverError::Duplicate {
                kind: "behavior",
                name: "recording".into()
            }
        );
        assert!(resolver.resolve_behavior("recording").is_some());
        assert!(resolver.resolve_behavior("tracing").is_none());
    }
}
