//! Retry behavior.

use interpose_core::{BoxError, InterceptionBehavior, Invocation, MethodResult, Next};

/// Re-runs the rest of the chain while it fails.
///
/// Each attempt is an independent pass through the remaining behaviors,
/// handlers and the target. The last error is returned unchanged.
pub struct RetryBehavior {
    attempts: usize,
    retry_if: Box<dyn Fn(&BoxError) -> bool + Send + Sync>,
}

impl RetryBehavior {
    /// Try at most `attempts` times (at least once), retrying on any error.
    pub fn new(attempts: usize) -> Self {
        Self {
            attempts: attempts.max(1),
            retry_if: Box::new(|_| true),
        }
    }

    /// Retry only errors accepted by `predicate`.
    pub fn retry_if(mut self, predicate: impl Fn(&BoxError) -> bool + Send + Sync + 'static) -> Self {
        self.retry_if = Box::new(predicate);
        self
    }
}

impl InterceptionBehavior for RetryBehavior {
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        let mut attempt = 1;
        loop {
            match next.proceed(invocation) {
                Err(err) if attempt < self.attempts && (self.retry_if)(&err) => {
                    tracing::debug!(
                        method = %invocation.method(),
                        attempt,
                        error = %err,
                        "retrying intercepted call"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
