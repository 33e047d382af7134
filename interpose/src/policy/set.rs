//! The ordered policy collection and per-method handler selection.

use super::{DeclaredPolicy, InjectionPolicy};
use crate::pipeline::HandlerPipeline;
use interpose_core::{CallHandler, ConfigurationError, MethodDescriptor, MethodFlags};
use std::sync::Arc;

/// Every policy in effect for a container, declared policy first.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone, Default)]
pub struct PolicySet {
    declared: DeclaredPolicy,
    policies: Vec<Arc<dyn InjectionPolicy>>,
}

impl PolicySet {
    /// Start building a policy set.
    pub fn builder() -> PolicySetBuilder {
        PolicySetBuilder::default()
    }

    /// A set containing only an empty declared policy.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The implicit declared policy.
    pub fn declared(&self) -> &DeclaredPolicy {
        &self.declared
    }

    /// All policies in evaluation order, declared policy first.
    pub fn iter(&self) -> impl Iterator<Item = &dyn InjectionPolicy> {
        std::iter::once(&self.declared as &dyn InjectionPolicy)
            .chain(self.policies.iter().map(|p| p.as_ref()))
    }

    /// Number of policies, counting the declared one.
    pub fn len(&self) -> usize {
        self.policies.len() + 1
    }

    /// Whether no policy could ever contribute a handler.
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty() && self.policies.is_empty()
    }

    /// The handlers that apply to `method`, in execution order.
    ///
    /// Matching policies contribute their handlers in policy order. The
    /// concatenation is then stably sorted by ascending
    /// [`order`](CallHandler::order), so equal orders keep their relative
    /// position. Methods flagged `NO_POLICIES` get no handlers at all.
    pub fn handlers_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Vec<Arc<dyn CallHandler>>, ConfigurationError> {
        if method.flags().contains(MethodFlags::NO_POLICIES) {
            return Ok(Vec::new());
        }

        let mut handlers = Vec::new();
        for policy in self.iter() {
            let contributed = policy.handlers_for(method)?;
            if !contributed.is_empty() {
                tracing::trace!(
                    policy = policy.name(),
                    method = %method,
                    handlers = contributed.len(),
                    "policy applies"
                );
            }
            handlers.extend(contributed);
        }
        handlers.sort_by_key(|h| h.order());
        Ok(handlers)
    }

    /// Build the handler pipeline for `method`.
    pub fn pipeline_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<HandlerPipeline, ConfigurationError> {
        let handlers = self.handlers_for(method)?;
        tracing::debug!(method = %method, handlers = handlers.len(), "built handler pipeline");
        Ok(HandlerPipeline::new(handlers))
    }
}

impl std::fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|p| p.name())).finish()
    }
}

/// Builder for [`PolicySet`].
#[derive(Default)]
pub struct PolicySetBuilder {
    declared: DeclaredPolicy,
    policies: Vec<Arc<dyn InjectionPolicy>>,
}

impl PolicySetBuilder {
    /// Replace the declared policy.
    pub fn declared(mut self, declared: DeclaredPolicy) -> Self {
        self.declared = declared;
        self
    }

    /// Append a policy.
    pub fn policy(self, policy: impl InjectionPolicy + 'static) -> Self {
        self.shared_policy(Arc::new(policy))
    }

    /// Append a shared policy.
    pub fn shared_policy(mut self, policy: Arc<dyn InjectionPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    /// Freeze the set.
    pub fn build(self) -> PolicySet {
        PolicySet {
            declared: self.declared,
            policies: self.policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use interpose_std::{
        rules::{Always, MemberNameRule},
        testing::{CountingHandler, FailingRule},
    };

    fn method(name: &str) -> MethodDescriptor {
        MethodDescriptor::builder("Wrappable", name).build()
    }

    fn orders(handlers: &[Arc<dyn CallHandler>]) -> Vec<i32> {
        handlers.iter().map(|h| h.order()).collect()
    }

    #[test]
    fn declared_policy_comes_first() {
        let set = PolicySet::builder()
            .policy(Policy::builder("Policy1").rule(Always).build().unwrap())
            .build();
        let names: Vec<&str> = set.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["declared", "Policy1"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn handlers_are_sorted_stably_by_order() {
        let a = Arc::new(CountingHandler::with_order(5));
        let b = Arc::new(CountingHandler::with_order(5));
        let policy = Policy::builder("Policy1")
            .rule(Always)
            .shared_handler(a.clone())
            .handler(CountingHandler::with_order(1))
            .shared_handler(b.clone())
            .handler(CountingHandler::with_order(3))
            .build()
            .unwrap();
        let set = PolicySet::builder().policy(policy).build();

        let handlers = set.handlers_for(&method("method2")).unwrap();
        assert_eq!(orders(&handlers), vec![1, 3, 5, 5]);

        let a_dyn: Arc<dyn CallHandler> = a;
        let b_dyn: Arc<dyn CallHandler> = b;
        assert!(Arc::ptr_eq(&handlers[2], &a_dyn));
        assert!(Arc::ptr_eq(&handlers[3], &b_dyn));
    }

    #[test]
    fn only_matching_policies_contribute() {
        let set = PolicySet::builder()
            .policy(
                Policy::builder("Policy1")
                    .rule(MemberNameRule::new("method2").unwrap())
                    .handler(CountingHandler::with_order(1))
                    .build()
                    .unwrap(),
            )
            .policy(
                Policy::builder("Policy2")
                    .rule(MemberNameRule::new("method3").unwrap())
                    .handler(CountingHandler::with_order(2))
                    .build()
                    .unwrap(),
            )
            .build();

        assert_eq!(orders(&set.handlers_for(&method("method2")).unwrap()), vec![1]);
        assert_eq!(orders(&set.handlers_for(&method("method3")).unwrap()), vec![2]);
        assert!(set.handlers_for(&method("method4")).unwrap().is_empty());
    }

    #[test]
    fn no_policies_flag_suppresses_every_handler() {
        let set = PolicySet::builder()
            .declared(
                DeclaredPolicy::builder()
                    .on_type("Wrappable", CountingHandler::new())
                    .build(),
            )
            .policy(
                Policy::builder("Policy1")
                    .rule(Always)
                    .handler(CountingHandler::new())
                    .build()
                    .unwrap(),
            )
            .build();
        let opted_out = MethodDescriptor::builder("Wrappable", "method2")
            .flags(MethodFlags::NO_POLICIES)
            .build();
        assert!(set.handlers_for(&opted_out).unwrap().is_empty());
        assert_eq!(set.handlers_for(&method("method2")).unwrap().len(), 2);
    }

    #[test]
    fn rule_failure_surfaces_while_building() {
        let set = PolicySet::builder()
            .policy(Policy::builder("Policy1").rule(FailingRule).build().unwrap())
            .build();
        let err = set.pipeline_for(&method("method2")).unwrap_err();
        assert!(matches!(err, ConfigurationError::RuleFailed { .. }));
    }

    #[test]
    fn empty_set_reports_empty() {
        let set = PolicySet::empty();
        assert!(set.is_empty());
        assert!(set.pipeline_for(&method("method2")).unwrap().is_empty());
    }
}
