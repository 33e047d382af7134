//! Fallback behavior.

use interpose_core::{
    BoxError, InterceptionBehavior, Invocation, MethodDescriptor, MethodResult, Next, ReturnValue,
};

/// Substitutes a value when the rest of the chain fails.
///
/// `fallback` decides per method and error; returning `None` lets the error
/// through unchanged.
pub struct FallbackBehavior<F> {
    fallback: F,
}

impl<F> FallbackBehavior<F>
where
    F: Fn(&MethodDescriptor, &BoxError) -> Option<ReturnValue> + Send + Sync + 'static,
{
    /// Create a fallback behavior.
    pub fn new(fallback: F) -> Self {
        Self { fallback }
    }
}

impl<F> InterceptionBehavior for FallbackBehavior<F>
where
    F: Fn(&MethodDescriptor, &BoxError) -> Option<ReturnValue> + Send + Sync + 'static,
{
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        match next.proceed(invocation) {
            Err(err) => match (self.fallback)(invocation.method(), &err) {
                Some(value) => {
                    tracing::debug!(method = %invocation.method(), error = %err, "substituted fallback value");
                    Ok(value)
                }
                None => Err(err),
            },
            ok => ok,
        }
    }
}
