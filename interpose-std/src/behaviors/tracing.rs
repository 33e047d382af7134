//! Tracing Behavior - a span around every intercepted call.

use interpose_core::{InterceptionBehavior, Invocation, MethodResult, Next};

/// A behavior that runs every call inside a `tracing` span.
///
/// The span carries the method and the behavior's name; failures are
/// recorded as an event inside the span.
#[derive(Debug, Clone, Copy)]
pub struct TracingBehavior {
    name: &'static str,
}

impl TracingBehavior {
    /// Create a tracing behavior labelled `name`.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl InterceptionBehavior for TracingBehavior {
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        let span = tracing::info_span!(
            "intercepted_call",
            behavior = %self.name,
            method = %invocation.method(),
        );
        let _guard = span.enter();

        let result = next.proceed(invocation);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "call raised");
        }
        result
    }
}
