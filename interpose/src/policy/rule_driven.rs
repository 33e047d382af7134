//! Rule-driven policies.

use super::InjectionPolicy;
use interpose_core::{
    CallHandler, ConfigurationError, MatchingRule, MethodDescriptor, NoResolver, Resolver,
};
use std::sync::Arc;

/// A named bundle of matching rules and call handlers.
///
/// A method matches when **any** rule matches. A policy without rules
/// matches nothing and never contributes handlers.
#[derive(Clone)]
pub struct Policy {
    name: String,
    rules: Vec<Arc<dyn MatchingRule>>,
    handlers: Vec<Arc<dyn CallHandler>>,
}

impl Policy {
    /// Start building a policy called `name`.
    pub fn builder(name: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder::new(name)
    }

    /// The matching rules, in registration order.
    pub fn rules(&self) -> &[Arc<dyn MatchingRule>] {
        &self.rules
    }

    /// The handlers, in registration order.
    pub fn handlers(&self) -> &[Arc<dyn CallHandler>] {
        &self.handlers
    }

    /// Whether the policy applies to `method`.
    ///
    /// A failing rule is reported as [`ConfigurationError::RuleFailed`].
    pub fn matches(&self, method: &MethodDescriptor) -> Result<bool, ConfigurationError> {
        for rule in &self.rules {
            let hit = rule
                .matches(method)
                .map_err(|source| ConfigurationError::RuleFailed {
                    rule: rule.name().to_string(),
                    method: method.to_string(),
                    source,
                })?;
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl InjectionPolicy for Policy {
    fn name(&self) -> &str {
        &self.name
    }

    fn handlers_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Vec<Arc<dyn CallHandler>>, ConfigurationError> {
        if self.matches(method)? {
            Ok(self.handlers.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

enum Entry<T: ?Sized> {
    Instance(Arc<T>),
    Named(String),
}

/// Builder for [`Policy`].
///
/// Rules and handlers may be given as instances or by name; names are
/// resolved when the policy is built.
///
/// # Example
/// ```ignore
/// let policy = Policy::builder("Policy1")
///     .rule(MemberNameRule::new("save*")?)
///     .handler(LoggingHandler::default())
///     .handler_named("audit")
///     .build_with(&resolver)?;
/// ```
pub struct PolicyBuilder {
    name: String,
    rules: Vec<Entry<dyn MatchingRule>>,
    handlers: Vec<Entry<dyn CallHandler>>,
}

impl PolicyBuilder {
    /// Create a builder for a policy called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Add a matching rule.
    pub fn rule(self, rule: impl MatchingRule) -> Self {
        self.shared_rule(Arc::new(rule))
    }

    /// Add a shared matching rule.
    pub fn shared_rule(mut self, rule: Arc<dyn MatchingRule>) -> Self {
        self.rules.push(Entry::Instance(rule));
        self
    }

    /// Add a matching rule resolved by name at build time.
    pub fn rule_named(mut self, name: impl Into<String>) -> Self {
        self.rules.push(Entry::Named(name.into()));
        self
    }

    /// Add a call handler.
    pub fn handler(self, handler: impl CallHandler) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Add a shared call handler.
    pub fn shared_handler(mut self, handler: Arc<dyn CallHandler>) -> Self {
        self.handlers.push(Entry::Instance(handler));
        self
    }

    /// Add a call handler resolved by name at build time.
    pub fn handler_named(mut self, name: impl Into<String>) -> Self {
        self.handlers.push(Entry::Named(name.into()));
        self
    }

    /// Build without a resolver. Any named reference fails.
    pub fn build(self) -> Result<Policy, ConfigurationError> {
        self.build_with(&NoResolver)
    }

    /// Build, resolving named references through `resolver`.
    pub fn build_with(self, resolver: &dyn Resolver) -> Result<Policy, ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyPolicyName);
        }
        let policy = self.name;

        let rules = self
            .rules
            .into_iter()
            .map(|entry| match entry {
                Entry::Instance(rule) => Ok(rule),
                Entry::Named(name) if name.is_empty() => Err(ConfigurationError::MissingReference {
                    policy: policy.clone(),
                    kind: "matching rule",
                }),
                Entry::Named(name) => resolver.resolve_rule(&name).ok_or_else(|| {
                    ConfigurationError::UnresolvedRule {
                        policy: policy.clone(),
                        name,
                    }
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let handlers = self
            .handlers
            .into_iter()
            .map(|entry| match entry {
                Entry::Instance(handler) => Ok(handler),
                Entry::Named(name) if name.is_empty() => Err(ConfigurationError::MissingReference {
                    policy: policy.clone(),
                    kind: "call handler",
                }),
                Entry::Named(name) => resolver.resolve_handler(&name).ok_or_else(|| {
                    ConfigurationError::UnresolvedHandler {
                        policy: policy.clone(),
                        name,
                    }
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            tracing::debug!(policy = %policy, "policy has no matching rules and will match nothing");
        }

        Ok(Policy {
            name: policy,
            rules,
            handlers,
        })
    }
}
