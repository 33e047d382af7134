//! Proxy factories.

use super::{Contract, Intercept, InterceptionControl};
use interpose_core::{CapabilitySet, ConfigurationError, Interceptor, ProxyShape};
use std::{marker::PhantomData, sync::Arc};

/// Creates proxies of one contract with a fixed surface.
///
/// Every proxy gets its own [`InterceptionControl`] with an empty behavior
/// chain.
pub struct ProxyFactory<C: Contract> {
    shape: ProxyShape,
    _contract: PhantomData<fn() -> C>,
}

impl<C: Contract> ProxyFactory<C> {
    /// Ask `interceptor` for the proxy surface of `C`.
    ///
    /// Fails with [`ConfigurationError::Declined`] if the interceptor cannot
    /// intercept the contract.
    pub fn new(
        interceptor: &dyn Interceptor,
        additional: CapabilitySet,
    ) -> Result<Self, ConfigurationError> {
        let shape = interceptor.create_proxy(C::descriptor(), additional)?;
        tracing::info!(
            contract = shape.ty().name(),
            interceptor = interceptor.name(),
            capabilities = shape.capabilities().len(),
            "proxy factory created"
        );
        Ok(Self {
            shape,
            _contract: PhantomData,
        })
    }

    /// The surface every proxy will expose.
    pub fn shape(&self) -> &ProxyShape {
        &self.shape
    }

    /// Wrap `target` in a fresh proxy.
    pub fn create<T>(&self, target: T) -> C::Proxy
    where
        C: Intercept<T>,
    {
        self.create_shared(Arc::new(target))
    }

    /// Wrap a shared `target` in a fresh proxy.
    pub fn create_shared<T>(&self, target: Arc<T>) -> C::Proxy
    where
        C: Intercept<T>,
    {
        let control = Arc::new(InterceptionControl::new(self.shape.clone()));
        C::proxy(target, control)
    }
}

impl<C: Contract> Clone for ProxyFactory<C> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            _contract: PhantomData,
        }
    }
}

impl<C: Contract> std::fmt::Debug for ProxyFactory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyFactory")
            .field("contract", &self.shape.ty().name())
            .finish()
    }
}
