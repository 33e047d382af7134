//! Per-proxy interception state.

use crate::behavior::EffectiveBehaviorChain;
use interpose_core::{
    Arguments, Capability, ConfigurationError, Continuation, InterceptError, InterceptionBehavior,
    Invocation, MethodDescriptor, MethodResult, ProxyShape,
};
use parking_lot::Mutex;
use std::{
    any::Any,
    sync::{Arc, OnceLock},
};

#[derive(Default)]
struct Pending {
    behaviors: Vec<Arc<dyn InterceptionBehavior>>,
    sealed: bool,
}

/// The behavior chain of one proxy, plus its exposed surface.
///
/// Behaviors may be added until the first call; the chain is then frozen
/// and further additions fail with
/// [`ConfigurationError::BehaviorAfterFirstCall`].
pub struct InterceptionControl {
    shape: ProxyShape,
    pending: Mutex<Pending>,
    chain: OnceLock<EffectiveBehaviorChain>,
}

impl InterceptionControl {
    /// A control with no behaviors.
    pub fn new(shape: ProxyShape) -> Self {
        Self {
            shape,
            pending: Mutex::new(Pending::default()),
            chain: OnceLock::new(),
        }
    }

    /// The surface this proxy exposes.
    pub fn shape(&self) -> &ProxyShape {
        &self.shape
    }

    /// Name of the intercepted contract.
    pub fn contract(&self) -> &str {
        self.shape.ty().name()
    }

    /// Append a behavior, consulting its `will_execute` once.
    pub fn add_interception_behavior(
        &self,
        behavior: Arc<dyn InterceptionBehavior>,
    ) -> Result<(), ConfigurationError> {
        if !behavior.will_execute() {
            tracing::debug!(contract = self.contract(), "behavior will not execute, skipping");
            return self.ensure_open();
        }
        self.push_effective(behavior)
    }

    /// Append a behavior already known to execute.
    pub(crate) fn push_effective(
        &self,
        behavior: Arc<dyn InterceptionBehavior>,
    ) -> Result<(), ConfigurationError> {
        let mut pending = self.pending.lock();
        if pending.sealed {
            return Err(self.sealed_error());
        }
        pending.behaviors.push(behavior);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ConfigurationError> {
        if self.pending.lock().sealed {
            Err(self.sealed_error())
        } else {
            Ok(())
        }
    }

    fn sealed_error(&self) -> ConfigurationError {
        ConfigurationError::BehaviorAfterFirstCall {
            contract: self.contract().to_string(),
        }
    }

    /// Whether the chain has been frozen by a first call.
    pub fn is_sealed(&self) -> bool {
        self.chain.get().is_some()
    }

    /// Number of effective behaviors.
    pub fn behavior_count(&self) -> usize {
        match self.chain.get() {
            Some(chain) => chain.len(),
            None => self.pending.lock().behaviors.len(),
        }
    }

    /// The frozen chain, freezing it on first use.
    pub fn chain(&self) -> &EffectiveBehaviorChain {
        self.chain.get_or_init(|| {
            let mut pending = self.pending.lock();
            pending.sealed = true;
            tracing::debug!(
                contract = self.contract(),
                behaviors = pending.behaviors.len(),
                "behavior chain frozen"
            );
            EffectiveBehaviorChain::from_effective(std::mem::take(&mut pending.behaviors))
        })
    }

    /// Send `invocation` through the chain, finishing with `target`.
    pub fn dispatch(&self, invocation: &mut Invocation, target: &dyn Continuation) -> MethodResult {
        tracing::trace!(method = %invocation.method(), "dispatching intercepted call");
        self.chain().invoke(invocation, target)
    }

    /// Additional capabilities exposed by this proxy.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.shape.capabilities().iter()
    }

    /// Whether the proxy exposes the capability called `name`.
    pub fn implements(&self, name: &str) -> bool {
        self.shape.capabilities().contains(name)
    }

    /// Call a capability method the target does not implement.
    ///
    /// The call goes through the whole chain; if nothing answers it, it
    /// fails with [`InterceptError::NotImplemented`].
    pub fn invoke_capability(
        &self,
        method: &MethodDescriptor,
        arguments: Arguments,
        target: Arc<dyn Any + Send + Sync>,
    ) -> MethodResult {
        if self.shape.capabilities().owner_of(method).is_none() {
            return Err(Box::new(InterceptError::Configuration(
                ConfigurationError::UnknownCapabilityMethod {
                    method: method.to_string(),
                },
            )));
        }
        let mut invocation = Invocation::new(method.clone(), arguments, target);
        let unanswered = |inv: &mut Invocation| -> MethodResult {
            Err(Box::new(InterceptError::NotImplemented {
                method: inv.method().to_string(),
            }))
        };
        self.dispatch(&mut invocation, &unanswered)
    }
}

impl std::fmt::Debug for InterceptionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptionControl")
            .field("contract", &self.contract())
            .field("sealed", &self.is_sealed())
            .field("behaviors", &self.behavior_count())
            .finish()
    }
}

/// The interception control surface every proxy exposes.
pub trait InterceptingProxy: Send + Sync {
    /// The proxy's control.
    fn interception(&self) -> &InterceptionControl;

    /// Call a capability method on the proxy.
    fn invoke_capability(&self, method: &MethodDescriptor, arguments: Arguments) -> MethodResult;

    /// Append a behavior to this proxy's chain. Only valid before the first call.
    fn add_interception_behavior(
        &self,
        behavior: impl InterceptionBehavior,
    ) -> Result<(), ConfigurationError>
    where
        Self: Sized,
    {
        self.interception()
            .add_interception_behavior(Arc::new(behavior))
    }

    /// Whether the proxy exposes the capability called `name`.
    fn implements(&self, name: &str) -> bool {
        self.interception().implements(name)
    }
}
