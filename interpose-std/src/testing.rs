//! Testing utilities for Interpose.
//!
//! This module provides doubles that make asserting on interception easier.
//!
//! # Features
//!
//! - [`CountingHandler`]: A call handler counting the calls that reach it
//! - [`OrderRecordingHandler`]: A call handler logging its id into a shared list
//! - [`RecordingBehavior`]: A behavior recording the methods it sees
//! - [`FailingBehavior`] / [`ShortCircuitBehavior`]: Behaviors that never proceed
//! - [`SkippedBehavior`]: A behavior that opts out via `will_execute`
//! - [`FailingRule`]: A matching rule that always errors

use interpose_core::{
    BoxError, CallHandler, InterceptionBehavior, Invocation, MatchingRule, MethodDescriptor,
    MethodResult, Next, ReturnValue,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

/// A simple error for tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TestError(pub String);

// ============================================================================
// Counting Handler
// ============================================================================

/// A call handler that counts invocations.
///
/// Clones share the same counter.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHandler::new();
/// let counter_clone = counter.clone();
///
/// // Use in a policy...
/// proxy.method2();
///
/// assert_eq!(counter_clone.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
    order: i32,
}

impl CountingHandler {
    /// Create a new counting handler at order 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counting handler at `order`.
    pub fn with_order(order: i32) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            order,
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl CallHandler for CountingHandler {
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        next.proceed(invocation)
    }
}

// ============================================================================
// Order Recording Handler
// ============================================================================

/// A call handler that appends its id to a shared log, then proceeds.
pub struct OrderRecordingHandler {
    id: usize,
    order: i32,
    log: Arc<Mutex<Vec<usize>>>,
}

impl OrderRecordingHandler {
    /// Create a handler writing `id` into `log`, running at `order`.
    pub fn new(id: usize, order: i32, log: Arc<Mutex<Vec<usize>>>) -> Self {
        Self { id, order, log }
    }
}

impl CallHandler for OrderRecordingHandler {
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.log.lock().unwrap().push(self.id);
        next.proceed(invocation)
    }
}

// ============================================================================
// Behaviors
// ============================================================================

/// A behavior recording the name of every method it sees, then proceeding.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingBehavior {
    methods: Arc<Mutex<Vec<String>>>,
}

impl RecordingBehavior {
    /// Create a new recording behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the methods seen so far, in call order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }

    /// Number of calls seen.
    pub fn count(&self) -> usize {
        self.methods.lock().unwrap().len()
    }
}

impl InterceptionBehavior for RecordingBehavior {
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.methods
            .lock()
            .unwrap()
            .push(invocation.method().name().to_string());
        next.proceed(invocation)
    }
}

/// A behavior that raises [`TestError`] without proceeding.
#[derive(Clone)]
pub struct FailingBehavior {
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingBehavior {
    /// Fail every call with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of calls that reached this behavior.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InterceptionBehavior for FailingBehavior {
    fn invoke(&self, invocation: &mut Invocation, _next: Next<'_>) -> MethodResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        invocation.raise(TestError(self.message.clone()))
    }
}

/// A behavior that returns a fixed value without proceeding.
pub struct ShortCircuitBehavior<T> {
    value: T,
}

impl<T: Clone + Send + Sync + 'static> ShortCircuitBehavior<T> {
    /// Answer every call with `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Send + Sync + 'static> InterceptionBehavior for ShortCircuitBehavior<T> {
    fn invoke(&self, _invocation: &mut Invocation, _next: Next<'_>) -> MethodResult {
        Ok(ReturnValue::new(self.value.clone()))
    }
}

/// A behavior that declines to execute.
///
/// Counts how often it was asked and how often (wrongly) invoked.
#[derive(Clone, Default)]
pub struct SkippedBehavior {
    checks: Arc<AtomicUsize>,
    invocations: Arc<AtomicUsize>,
}

impl SkippedBehavior {
    /// Create a new skipped behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `will_execute` checks.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Number of invocations; should stay 0.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl InterceptionBehavior for SkippedBehavior {
    fn will_execute(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        false
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        next.proceed(invocation)
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A matching rule that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRule;

impl MatchingRule for FailingRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Err(Box::new(TestError(format!("cannot evaluate {method}"))))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
