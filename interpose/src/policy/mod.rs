//! Policies.
//!
//! A policy decides, for one method, whether it applies and which call
//! handlers it contributes. Two kinds exist:
//!
//! - [`Policy`]: a named set of matching rules plus handlers (rule driven)
//! - [`DeclaredPolicy`]: handlers declared directly against types, methods,
//!   parameters or tags (the implicit policy every [`PolicySet`] starts with)

mod declared;
mod rule_driven;
mod set;

pub use declared::{DeclarationTarget, DeclaredPolicy, DeclaredPolicyBuilder, HandlerDeclaration};
#[cfg(feature = "inventory")]
pub use declared::DeclarationSubmission;
pub use rule_driven::{Policy, PolicyBuilder};
pub use set::{PolicySet, PolicySetBuilder};

use interpose_core::{CallHandler, ConfigurationError, MethodDescriptor};
use std::sync::Arc;

/// A unit of handler selection.
pub trait InjectionPolicy: Send + Sync {
    /// Policy name.
    fn name(&self) -> &str;

    /// Handlers this policy contributes to `method`, in the policy's own order.
    ///
    /// An empty list means the policy does not apply.
    fn handlers_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Vec<Arc<dyn CallHandler>>, ConfigurationError>;
}
