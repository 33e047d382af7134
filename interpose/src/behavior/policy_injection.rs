//! The behavior that runs per-method handler pipelines.

use crate::{
    pipeline::{HandlerPipeline, PipelineCache},
    policy::PolicySet,
};
use interpose_core::{
    CapabilitySet, ConfigurationError, InterceptError, InterceptionBehavior, Invocation,
    MethodDescriptor, MethodResult, Next, TypeDescriptor,
};
use std::sync::Arc;

/// Bridges the behavior chain to the policy system.
///
/// For each call it looks up (or builds, once) the pipeline for the invoked
/// method and runs it, finishing with its own continuation: the real target
/// when it sits innermost, as it does by default. One instance may serve
/// many proxies; they then share its pipeline cache.
pub struct PolicyInjectionBehavior {
    policies: Arc<PolicySet>,
    cache: PipelineCache,
    will_execute: bool,
}

impl PolicyInjectionBehavior {
    /// Build pipelines lazily, on first call of each method.
    pub fn new(policies: Arc<PolicySet>) -> Self {
        let will_execute = !policies.is_empty();
        Self {
            policies,
            cache: PipelineCache::new(),
            will_execute,
        }
    }

    /// Build the pipeline of every method a proxy of `ty` exposes up front:
    /// the contract's own methods and those of `capabilities`.
    ///
    /// Rule failures surface here instead of on first call, and the behavior
    /// only executes if at least one method ended up with handlers.
    pub fn for_surface(
        policies: Arc<PolicySet>,
        ty: &TypeDescriptor,
        capabilities: &CapabilitySet,
    ) -> Result<Self, ConfigurationError> {
        let behavior = Self::new(policies);
        let surface = ty
            .methods()
            .iter()
            .chain(capabilities.iter().flat_map(|c| c.methods()));
        let mut methods = 0;
        let mut any_handlers = false;
        for method in surface {
            methods += 1;
            any_handlers |= !behavior.pipeline_for(method)?.is_empty();
        }
        tracing::debug!(
            contract = ty.name(),
            methods,
            capabilities = capabilities.len(),
            any_handlers,
            "primed handler pipelines"
        );
        Ok(Self {
            will_execute: any_handlers,
            ..behavior
        })
    }

    /// The policy set pipelines are built from.
    pub fn policies(&self) -> &Arc<PolicySet> {
        &self.policies
    }

    /// The (cached) pipeline for `method`.
    pub fn pipeline_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Arc<HandlerPipeline>, ConfigurationError> {
        self.cache
            .get_or_try_insert_with(method, || self.policies.pipeline_for(method))
    }

    /// Number of methods with a cached pipeline.
    pub fn cached_methods(&self) -> usize {
        self.cache.len()
    }
}

impl InterceptionBehavior for PolicyInjectionBehavior {
    fn will_execute(&self) -> bool {
        self.will_execute
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        let pipeline = match self.pipeline_for(invocation.method()) {
            Ok(pipeline) => pipeline,
            Err(err) => return Err(Box::new(InterceptError::Configuration(err))),
        };
        if pipeline.is_empty() {
            return next.proceed(invocation);
        }
        pipeline.invoke(invocation, next)
    }
}

impl std::fmt::Debug for PolicyInjectionBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyInjectionBehavior")
            .field("policies", &self.policies)
            .field("cached_methods", &self.cache.len())
            .field("will_execute", &self.will_execute)
            .finish()
    }
}
