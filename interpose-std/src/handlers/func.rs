//! Closure-backed call handlers.

use interpose_core::{CallHandler, Invocation, MethodResult, Next};

/// A call handler built from a closure.
pub struct FnHandler<F> {
    f: F,
    order: i32,
}

/// Build a call handler from `f`, running at `order`.
///
/// # Example
///
/// ```rust
/// use interpose_std::handlers::handler_fn;
///
/// // Doubles the first argument before forwarding.
/// let doubler = handler_fn(5, |invocation, next| {
///     let value = *invocation.arguments().get::<i32>(0)?;
///     invocation.arguments_mut().set(0, value * 2)?;
///     next.proceed(invocation)
/// });
/// ```
pub fn handler_fn<F>(order: i32, f: F) -> FnHandler<F>
where
    F: Fn(&mut Invocation, Next<'_>) -> MethodResult + Send + Sync + 'static,
{
    FnHandler { f, order }
}

impl<F> CallHandler for FnHandler<F>
where
    F: Fn(&mut Invocation, Next<'_>) -> MethodResult + Send + Sync + 'static,
{
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        (self.f)(invocation, next)
    }
}
