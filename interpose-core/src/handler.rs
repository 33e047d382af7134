//! # Call handlers
//!
//! Call handlers are the per-method links of interception. Policies select
//! them by matching rules; the selected handlers run as a nested chain sorted
//! by [`order`](CallHandler::order), and the innermost one forwards to the
//! real target.
//!
//! Handlers are opaque to the framework. Any state they keep (counters,
//! caches) belongs to the handler instance and is shared by every call that
//! reaches it, including concurrent ones.

use crate::{
    chain::Next,
    invocation::{Invocation, MethodResult},
};
use std::sync::Arc;

/// A cross-cutting link selected per method.
///
/// # Example
///
/// ```rust
/// use interpose_core::{CallHandler, Invocation, MethodResult, Next};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct CountCalls(AtomicUsize);
///
/// impl CallHandler for CountCalls {
///     fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         next.proceed(invocation)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `CallHandler`",
    label = "missing `CallHandler` implementation",
    note = "Handlers implement `invoke(&mut Invocation, Next) -> MethodResult`."
)]
pub trait CallHandler: Send + Sync + 'static {
    /// Position in the pipeline; lower runs first (outermost).
    fn order(&self) -> i32 {
        0
    }

    /// Handle the call, usually by calling `next.proceed(invocation)`.
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult;
}

impl<H: CallHandler + ?Sized> CallHandler for Arc<H> {
    fn order(&self) -> i32 {
        (**self).order()
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        (**self).invoke(invocation, next)
    }
}

/// Gives any handler a fixed order.
///
/// Lets the configuration layer place a handler without the handler knowing
/// its position.
#[derive(Debug, Clone)]
pub struct Ordered<H> {
    inner: H,
    order: i32,
}

impl<H> Ordered<H> {
    /// Wrap `inner` with `order`.
    pub fn new(inner: H, order: i32) -> Self {
        Self { inner, order }
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: CallHandler> CallHandler for Ordered<H> {
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.inner.invoke(invocation, next)
    }
}
