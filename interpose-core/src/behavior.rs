//! # Interception behaviors
//!
//! Behaviors wrap every call made through a proxy, regardless of method. They
//! form the outer chain; one of them (the policy injection behavior) runs the
//! per-method call handler pipeline.

use crate::{
    chain::Next,
    contract::Capability,
    invocation::{Invocation, MethodResult},
};
use std::sync::Arc;

/// A chain-of-responsibility link applied to all methods of a proxy.
///
/// `will_execute` is consulted once, before the behavior is attached; a
/// behavior answering `false` is left out of the chain and never invoked.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `InterceptionBehavior`",
    label = "missing `InterceptionBehavior` implementation",
    note = "Behaviors implement `invoke(&mut Invocation, Next) -> MethodResult`."
)]
pub trait InterceptionBehavior: Send + Sync + 'static {
    /// Whether this behavior belongs in the chain at all.
    fn will_execute(&self) -> bool {
        true
    }

    /// Extra capabilities a proxy must expose for this behavior to work.
    fn required_capabilities(&self) -> Vec<Capability> {
        Vec::new()
    }

    /// Handle the call, usually by calling `next.proceed(invocation)`.
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult;
}

impl<B: InterceptionBehavior + ?Sized> InterceptionBehavior for Arc<B> {
    fn will_execute(&self) -> bool {
        (**self).will_execute()
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        (**self).required_capabilities()
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        (**self).invoke(invocation, next)
    }
}
