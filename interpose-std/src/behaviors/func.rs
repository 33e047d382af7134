//! Closure-backed behaviors.

use interpose_core::{InterceptionBehavior, Invocation, MethodResult, Next};

/// A behavior built from a closure.
pub struct FnBehavior<F> {
    f: F,
}

/// Build a behavior from `f`.
pub fn behavior_fn<F>(f: F) -> FnBehavior<F>
where
    F: Fn(&mut Invocation, Next<'_>) -> MethodResult + Send + Sync + 'static,
{
    FnBehavior { f }
}

impl<F> InterceptionBehavior for FnBehavior<F>
where
    F: Fn(&mut Invocation, Next<'_>) -> MethodResult + Send + Sync + 'static,
{
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        (self.f)(invocation, next)
    }
}
