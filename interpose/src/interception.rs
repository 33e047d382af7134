//! # Interception
//!
//! Puts the pieces together for one container: an interceptor, the policy
//! set, extra behaviors and extra capabilities. Preparing a contract
//!
//! 1. asks the interceptor whether the contract can be intercepted at all
//!    (if not, targets are handed back unproxied),
//! 2. keeps the configured behaviors that will execute and collects the
//!    capabilities the proxy must expose,
//! 3. primes the policy injection behavior over the contract and capability
//!    methods, keeping it only if some method has handlers,
//! 4. fixes the proxy surface through the interceptor.
//!
//! The policy injection behavior occupies one slot of the behavior order.
//! Unless placed explicitly with
//! [`policy_injection`](InterceptionBuilder::policy_injection) it is
//! innermost, so the handler pipeline runs right around the target and the
//! configured behaviors see its results and errors.
//!
//! Each created proxy then gets the effective behaviors attached through its
//! [`InterceptionControl`](crate::proxy::InterceptionControl).

use crate::{
    behavior::{EffectiveBehaviorChain, PolicyInjectionBehavior},
    policy::PolicySet,
    proxy::{Contract, Intercept, InterceptingProxy, ProxyFactory},
};
use interpose_core::{
    Capability, CapabilitySet, ConfigurationError, ContractInterceptor, InterceptionBehavior,
    Interceptor, NoResolver, Resolver,
};
use std::sync::Arc;

/// An interceptor, given directly or by name.
#[derive(Clone)]
pub enum InterceptorRef {
    /// A concrete interceptor.
    Instance(Arc<dyn Interceptor>),
    /// An interceptor to look up through the resolver.
    Named(String),
}

impl InterceptorRef {
    fn resolve(self, resolver: &dyn Resolver) -> Result<Arc<dyn Interceptor>, ConfigurationError> {
        match self {
            Self::Instance(interceptor) => Ok(interceptor),
            Self::Named(name) => resolver
                .resolve_interceptor(&name)
                .ok_or(ConfigurationError::UnresolvedInterceptor { name }),
        }
    }
}

impl Default for InterceptorRef {
    fn default() -> Self {
        Self::Instance(Arc::new(ContractInterceptor))
    }
}

impl std::fmt::Debug for InterceptorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(interceptor) => f.debug_tuple("Instance").field(&interceptor.name()).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// One slot of the configured behavior order.
#[derive(Clone)]
pub enum BehaviorRef {
    /// A concrete behavior.
    Instance(Arc<dyn InterceptionBehavior>),
    /// A behavior to look up through the resolver.
    Named(String),
    /// Where the policy injection behavior runs.
    PolicyInjection,
}

impl BehaviorRef {
    fn resolve(self, resolver: &dyn Resolver) -> Result<Slot, ConfigurationError> {
        match self {
            Self::Instance(behavior) => Ok(Slot::Behavior(behavior)),
            Self::Named(name) => resolver
                .resolve_behavior(&name)
                .map(Slot::Behavior)
                .ok_or(ConfigurationError::UnresolvedBehavior { name }),
            Self::PolicyInjection => Ok(Slot::PolicyInjection),
        }
    }
}

impl std::fmt::Debug for BehaviorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("Instance"),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::PolicyInjection => f.write_str("PolicyInjection"),
        }
    }
}

#[derive(Clone)]
enum Slot {
    Behavior(Arc<dyn InterceptionBehavior>),
    PolicyInjection,
}

/// Outcome of intercepting a target.
#[derive(Debug)]
pub enum Intercepted<P, T> {
    /// The target was wrapped.
    Proxied(P),
    /// The interceptor declined; the target is returned untouched.
    Declined(T),
}

impl<P, T> Intercepted<P, T> {
    /// The proxy, if one was created.
    pub fn proxy(self) -> Option<P> {
        match self {
            Self::Proxied(proxy) => Some(proxy),
            Self::Declined(_) => None,
        }
    }

    /// Whether the target was wrapped.
    pub fn is_proxied(&self) -> bool {
        matches!(self, Self::Proxied(_))
    }
}

/// Interception configuration for a container.
pub struct Interception {
    interceptor: Arc<dyn Interceptor>,
    policies: Arc<PolicySet>,
    slots: Vec<Slot>,
    capabilities: CapabilitySet,
}

impl Interception {
    /// Start configuring interception.
    pub fn builder() -> InterceptionBuilder {
        InterceptionBuilder::default()
    }

    /// The selected interceptor.
    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }

    /// The policy set handler pipelines are built from.
    pub fn policies(&self) -> &Arc<PolicySet> {
        &self.policies
    }

    /// Prepare proxies for contract `C`.
    ///
    /// Returns `Ok(None)` when the interceptor declines the contract.
    /// Pipelines of every contract and capability method are built here, so
    /// failing matching rules are reported now rather than on first call.
    pub fn prepare<C: Contract>(&self) -> Result<Option<PreparedProxy<C>>, ConfigurationError> {
        let ty = C::descriptor();
        if !self.interceptor.can_intercept(ty) {
            tracing::warn!(
                contract = ty.name(),
                interceptor = self.interceptor.name(),
                "interceptor declined contract, targets will not be proxied"
            );
            return Ok(None);
        }

        let mut capabilities = self.capabilities.clone();
        let mut kept = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            if let Slot::Behavior(behavior) = slot {
                if !behavior.will_execute() {
                    tracing::debug!(
                        contract = ty.name(),
                        "interception behavior will not execute, skipping"
                    );
                    continue;
                }
                capabilities.extend(behavior.required_capabilities());
            }
            kept.push(slot.clone());
        }

        let injection =
            PolicyInjectionBehavior::for_surface(self.policies.clone(), ty, &capabilities)?;
        let injection = injection
            .will_execute()
            .then(|| Arc::new(injection) as Arc<dyn InterceptionBehavior>);
        let behaviors = EffectiveBehaviorChain::from_effective(
            kept.into_iter()
                .filter_map(|slot| match slot {
                    Slot::Behavior(behavior) => Some(behavior),
                    Slot::PolicyInjection => injection.clone(),
                })
                .collect(),
        );

        let factory = ProxyFactory::<C>::new(self.interceptor.as_ref(), capabilities)?;
        Ok(Some(PreparedProxy { factory, behaviors }))
    }

    /// Wrap `target`, or hand it back if the contract is declined.
    pub fn intercept<C, T>(&self, target: T) -> Result<Intercepted<C::Proxy, T>, ConfigurationError>
    where
        C: Intercept<T>,
    {
        match self.prepare::<C>()? {
            Some(prepared) => prepared.create(target).map(Intercepted::Proxied),
            None => Ok(Intercepted::Declined(target)),
        }
    }

    /// Like [`intercept`](Self::intercept), erased to the contract's trait object.
    pub fn wrap<C, T>(&self, target: T) -> Result<Box<C::Object>, ConfigurationError>
    where
        C: Intercept<T>,
    {
        Ok(match self.intercept::<C, T>(target)? {
            Intercepted::Proxied(proxy) => C::proxy_object(proxy),
            Intercepted::Declined(target) => C::target_object(target),
        })
    }
}

impl std::fmt::Debug for Interception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interception")
            .field("interceptor", &self.interceptor.name())
            .field("policies", &self.policies)
            .field("behaviors", &self.slots.len())
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}

/// Builder for [`Interception`].
///
/// Defaults to the [`ContractInterceptor`], an empty policy set and no
/// extra behaviors.
#[derive(Default)]
pub struct InterceptionBuilder {
    interceptor: InterceptorRef,
    resolver: Option<Arc<dyn Resolver>>,
    policies: Arc<PolicySet>,
    behaviors: Vec<BehaviorRef>,
    capabilities: CapabilitySet,
}

impl InterceptionBuilder {
    /// Use `interceptor`.
    pub fn interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptor = InterceptorRef::Instance(Arc::new(interceptor));
        self
    }

    /// Use the interceptor registered as `name` in the resolver.
    pub fn interceptor_named(mut self, name: impl Into<String>) -> Self {
        self.interceptor = InterceptorRef::Named(name.into());
        self
    }

    /// Resolver for named references.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Policies driving the handler pipelines.
    pub fn policies(self, policies: PolicySet) -> Self {
        self.shared_policies(Arc::new(policies))
    }

    /// Shared policies driving the handler pipelines.
    pub fn shared_policies(mut self, policies: Arc<PolicySet>) -> Self {
        self.policies = policies;
        self
    }

    /// Add a behavior. Behaviors run in the order they are added, the first
    /// one outermost.
    pub fn behavior(self, behavior: impl InterceptionBehavior) -> Self {
        self.shared_behavior(Arc::new(behavior))
    }

    /// Add a shared behavior.
    pub fn shared_behavior(mut self, behavior: Arc<dyn InterceptionBehavior>) -> Self {
        self.behaviors.push(BehaviorRef::Instance(behavior));
        self
    }

    /// Add the behavior registered as `name` in the resolver.
    pub fn behavior_named(mut self, name: impl Into<String>) -> Self {
        self.behaviors.push(BehaviorRef::Named(name.into()));
        self
    }

    /// Run the policy injection behavior here, after the behaviors added so
    /// far. Calling it again moves the slot.
    pub fn policy_injection(mut self) -> Self {
        self.behaviors
            .retain(|slot| !matches!(slot, BehaviorRef::PolicyInjection));
        self.behaviors.push(BehaviorRef::PolicyInjection);
        self
    }

    /// Expose an additional capability on every proxy.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Resolve references and freeze the configuration.
    pub fn build(mut self) -> Result<Interception, ConfigurationError> {
        if !self
            .behaviors
            .iter()
            .any(|slot| matches!(slot, BehaviorRef::PolicyInjection))
        {
            self.behaviors.push(BehaviorRef::PolicyInjection);
        }
        let resolver: &dyn Resolver = match &self.resolver {
            Some(resolver) => resolver.as_ref(),
            None => &NoResolver,
        };
        let interceptor = self.interceptor.resolve(resolver)?;
        let slots = self
            .behaviors
            .into_iter()
            .map(|slot| slot.resolve(resolver))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Interception {
            interceptor,
            policies: self.policies,
            slots,
            capabilities: self.capabilities,
        })
    }
}

/// Proxies of contract `C`, ready to be created.
///
/// All proxies created from one `PreparedProxy` share its policy injection
/// behavior and therefore its pipeline cache.
pub struct PreparedProxy<C: Contract> {
    factory: ProxyFactory<C>,
    behaviors: EffectiveBehaviorChain,
}

impl<C: Contract> PreparedProxy<C> {
    /// The underlying factory.
    pub fn factory(&self) -> &ProxyFactory<C> {
        &self.factory
    }

    /// Behaviors attached to every proxy.
    pub fn behaviors(&self) -> &EffectiveBehaviorChain {
        &self.behaviors
    }

    /// Wrap `target` in a new proxy with the effective behaviors attached.
    pub fn create<T>(&self, target: T) -> Result<C::Proxy, ConfigurationError>
    where
        C: Intercept<T>,
    {
        self.create_shared(Arc::new(target))
    }

    /// Wrap a shared `target` in a new proxy with the effective behaviors attached.
    pub fn create_shared<T>(&self, target: Arc<T>) -> Result<C::Proxy, ConfigurationError>
    where
        C: Intercept<T>,
    {
        let proxy = self.factory.create_shared(target);
        for behavior in self.behaviors.behaviors() {
            proxy.interception().push_effective(behavior.clone())?;
        }
        Ok(proxy)
    }
}
