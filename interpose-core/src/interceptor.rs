//! Interceptors.
//!
//! An interceptor decides whether a type can be proxied at all and fixes the
//! surface of the proxy: the target's own methods plus any additional
//! capabilities. Manufacturing the proxy object is left to the adapter
//! generated for each contract.

use crate::{
    contract::{CapabilitySet, TypeDescriptor, TypeKind},
    error::ConfigurationError,
};

/// The validated surface a proxy will expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyShape {
    ty: TypeDescriptor,
    capabilities: CapabilitySet,
}

impl ProxyShape {
    /// Create a shape exposing `ty` plus `capabilities`.
    pub fn new(ty: TypeDescriptor, capabilities: CapabilitySet) -> Self {
        Self { ty, capabilities }
    }

    /// The intercepted type.
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Additional capabilities the proxy exposes.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// Chooses the proxying technique for a type.
pub trait Interceptor: Send + Sync + 'static {
    /// Name used in diagnostics and for lookup.
    fn name(&self) -> &str;

    /// Whether `ty` exposes an interceptable surface.
    ///
    /// `false` is a legitimate answer: the type is then used unproxied.
    fn can_intercept(&self, ty: &TypeDescriptor) -> bool;

    /// Fix the surface of a proxy for `ty`.
    ///
    /// Callers are expected to check [`can_intercept`](Self::can_intercept)
    /// first; asking anyway yields [`ConfigurationError::Declined`].
    fn create_proxy(
        &self,
        ty: &TypeDescriptor,
        additional: CapabilitySet,
    ) -> Result<ProxyShape, ConfigurationError> {
        if !self.can_intercept(ty) {
            return Err(ConfigurationError::Declined {
                contract: ty.name().to_string(),
                interceptor: self.name().to_string(),
            });
        }
        Ok(ProxyShape::new(ty.clone(), additional))
    }
}

/// Intercepts capability contracts by re-implementing them on an adapter.
///
/// Sealed types and contracts without methods cannot be intercepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractInterceptor;

impl Interceptor for ContractInterceptor {
    fn name(&self) -> &str {
        "contract"
    }

    fn can_intercept(&self, ty: &TypeDescriptor) -> bool {
        ty.kind() == TypeKind::Contract && !ty.methods().is_empty()
    }
}
