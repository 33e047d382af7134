//! Continuations.
//!
//! Both behaviors and call handlers are links of a right-associative chain:
//! each link receives a [`Next`] that runs "the rest of the chain" (further
//! links, then the real target). A link may call it once, not at all
//! (short-circuit), or several times (retry); every call is an independent
//! pass through the remaining links.

use crate::invocation::{Invocation, MethodResult};

/// The rest of an interception chain.
pub trait Continuation: Send + Sync {
    /// Run the remaining links and the target.
    fn proceed(&self, invocation: &mut Invocation) -> MethodResult;
}

impl<F> Continuation for F
where
    F: Fn(&mut Invocation) -> MethodResult + Send + Sync,
{
    fn proceed(&self, invocation: &mut Invocation) -> MethodResult {
        (self)(invocation)
    }
}

/// Handle on the rest of the chain, passed to every link.
///
/// `Next` is `Copy`: calling [`proceed`](Next::proceed) again starts a fresh
/// pass over the remaining links.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a dyn Continuation,
}

impl<'a> Next<'a> {
    /// Wrap a continuation.
    pub fn new(rest: &'a dyn Continuation) -> Self {
        Self { rest }
    }

    /// Run the rest of the chain.
    pub fn proceed(self, invocation: &mut Invocation) -> MethodResult {
        self.rest.proceed(invocation)
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}
