#![allow(dead_code)]

use interpose::{
    BoxError, CallError, CallHandler, Invocation, MethodResult, Next, interceptable, restore,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

// ============================================================================
// Test Contracts
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key `{0}` not found")]
    Missing(String),
    #[error(transparent)]
    Intercepted(BoxError),
}

impl CallError for StoreError {
    fn into_box(self) -> BoxError {
        Box::new(self)
    }

    fn from_box(err: BoxError) -> Self {
        restore(err, StoreError::Intercepted)
    }
}

#[interceptable]
pub trait Wrappable: Send + Sync {
    fn method1(&self) -> i32;

    fn method2(&self, value: i32) -> i32;

    #[interpose(tag = "audit")]
    fn method3(&self, key: String) -> Result<String, StoreError>;

    #[interpose(no_policies)]
    fn method4(&self);
}

#[interceptable(name = "Settings")]
pub trait Settings: Send + Sync {
    #[interpose(getter)]
    fn get_level(&self) -> u8;

    #[interpose(setter)]
    fn set_level(&self, #[interpose(tag = "validated")] level: u8);
}

/// Counts how often each real method ran.
#[derive(Clone, Default)]
pub struct WrappableImpl {
    pub calls: Arc<AtomicUsize>,
}

impl WrappableImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Wrappable for WrappableImpl {
    fn method1(&self) -> i32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        1
    }

    fn method2(&self, value: i32) -> i32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value * 2
    }

    fn method3(&self, key: String) -> Result<String, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if key == "known" {
            Ok("value".to_string())
        } else {
            Err(StoreError::Missing(key))
        }
    }

    fn method4(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct SettingsImpl {
    pub level: AtomicUsize,
}

impl Settings for SettingsImpl {
    fn get_level(&self) -> u8 {
        self.level.load(Ordering::SeqCst) as u8
    }

    fn set_level(&self, level: u8) {
        self.level.store(level as usize, Ordering::SeqCst);
    }
}

// ============================================================================
// Test Handlers
// ============================================================================

/// A handler counting into an externally owned counter.
pub struct SharedCountHandler {
    pub counter: Arc<AtomicUsize>,
    pub order: i32,
}

impl CallHandler for SharedCountHandler {
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        self.counter.fetch_add(1, Ordering::SeqCst);
        next.proceed(invocation)
    }
}

/// A handler that replaces the first `i32` argument.
pub struct RewriteArgumentHandler {
    pub value: i32,
}

impl CallHandler for RewriteArgumentHandler {
    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        invocation.arguments_mut().set(0, self.value)?;
        next.proceed(invocation)
    }
}
