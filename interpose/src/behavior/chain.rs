//! Effective behavior chain.

use interpose_core::{Continuation, InterceptionBehavior, Invocation, MethodResult, Next};
use std::sync::Arc;

/// The behaviors that actually run, in registration order.
///
/// Behaviors whose [`will_execute`](InterceptionBehavior::will_execute) is
/// `false` are dropped when the chain is assembled and never invoked.
#[derive(Clone, Default)]
pub struct EffectiveBehaviorChain {
    behaviors: Arc<[Arc<dyn InterceptionBehavior>]>,
}

impl EffectiveBehaviorChain {
    /// Assemble a chain, consulting `will_execute` once per behavior.
    pub fn new(behaviors: impl IntoIterator<Item = Arc<dyn InterceptionBehavior>>) -> Self {
        Self::from_effective(
            behaviors
                .into_iter()
                .filter(|b| {
                    let keep = b.will_execute();
                    if !keep {
                        tracing::debug!("interception behavior will not execute, skipping");
                    }
                    keep
                })
                .collect(),
        )
    }

    /// Wrap behaviors that have already been checked.
    pub(crate) fn from_effective(behaviors: Vec<Arc<dyn InterceptionBehavior>>) -> Self {
        Self {
            behaviors: behaviors.into(),
        }
    }

    /// The behaviors, outermost first.
    pub fn behaviors(&self) -> &[Arc<dyn InterceptionBehavior>] {
        &self.behaviors
    }

    /// Number of behaviors.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Run the chain, finishing with `target`.
    ///
    /// An empty chain calls `target` directly.
    pub fn invoke(&self, invocation: &mut Invocation, target: &dyn Continuation) -> MethodResult {
        BehaviorCursor {
            behaviors: &self.behaviors,
            target: Next::new(target),
        }
        .proceed(invocation)
    }
}

impl std::fmt::Debug for EffectiveBehaviorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectiveBehaviorChain")
            .field("len", &self.behaviors.len())
            .finish()
    }
}

struct BehaviorCursor<'a> {
    behaviors: &'a [Arc<dyn InterceptionBehavior>],
    target: Next<'a>,
}

impl Continuation for BehaviorCursor<'_> {
    fn proceed(&self, invocation: &mut Invocation) -> MethodResult {
        let Some((behavior, rest)) = self.behaviors.split_first() else {
            return self.target.proceed(invocation);
        };
        let rest = BehaviorCursor {
            behaviors: rest,
            target: self.target,
        };
        behavior.invoke(invocation, Next::new(&rest))
    }
}
