//! Conditional Behavior - apply a behavior to some methods only.

use interpose_core::{
    Capability, InterceptionBehavior, Invocation, MethodDescriptor, MethodResult, Next,
};

/// A behavior that applies `inner` only to methods accepted by `condition`.
///
/// Other calls pass straight to the rest of the chain.
///
/// # Example
///
/// ```rust
/// use interpose_std::behaviors::{ConditionalBehavior, TracingBehavior};
/// use interpose_core::MethodDescriptor;
///
/// // Only trace writes.
/// let writes = ConditionalBehavior::new(
///     |m: &MethodDescriptor| m.name().starts_with("set_"),
///     TracingBehavior::new("writes"),
/// );
/// ```
pub struct ConditionalBehavior<C, B> {
    condition: C,
    inner: B,
}

impl<C, B> ConditionalBehavior<C, B> {
    /// Create a new `ConditionalBehavior`.
    pub fn new(condition: C, inner: B) -> Self {
        Self { condition, inner }
    }
}

impl<C, B> InterceptionBehavior for ConditionalBehavior<C, B>
where
    C: Fn(&MethodDescriptor) -> bool + Send + Sync + 'static,
    B: InterceptionBehavior,
{
    fn will_execute(&self) -> bool {
        self.inner.will_execute()
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        self.inner.required_capabilities()
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        if (self.condition)(invocation.method()) {
            self.inner.invoke(invocation, next)
        } else {
            next.proceed(invocation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBehavior;
    use interpose_core::{Arguments, ReturnValue};
    use std::sync::Arc;

    fn call(behavior: &dyn InterceptionBehavior, name: &str) {
        let method = MethodDescriptor::builder("T", name).build();
        let mut inv = Invocation::new(method, Arguments::new(), Arc::new(()));
        let target = |_: &mut Invocation| -> MethodResult { Ok(ReturnValue::unit()) };
        behavior.invoke(&mut inv, Next::new(&target)).unwrap();
    }

    #[test]
    fn inner_runs_only_when_condition_holds() {
        let recorder = RecordingBehavior::new();
        let behavior = ConditionalBehavior::new(
            |m: &MethodDescriptor| m.name() == "save",
            recorder.clone(),
        );

        call(&behavior, "save");
        call(&behavior, "load");

        assert_eq!(recorder.methods(), vec!["save".to_string()]);
    }
}
