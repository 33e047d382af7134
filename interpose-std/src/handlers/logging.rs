//! Logging handler for call observation.

use interpose_core::{CallHandler, Invocation, MethodResult, Next};
use std::time::Instant;
use tracing::Level;

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: Level = $level;
        if level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if level == Level::INFO {
            tracing::info!($($arg)+)
        } else if level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    }};
}

/// A handler that logs each call, its duration and its outcome.
///
/// Failures are always logged at `WARN` or above.
#[derive(Debug, Clone)]
pub struct LoggingHandler {
    level: Level,
    order: i32,
}

impl LoggingHandler {
    /// Log at `level`, running at order 0.
    pub fn new(level: Level) -> Self {
        Self { level, order: 0 }
    }

    /// Run at `order`.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl CallHandler for LoggingHandler {
    fn order(&self) -> i32 {
        self.order
    }

    fn invoke(&self, invocation: &mut Invocation, next: Next<'_>) -> MethodResult {
        let method = invocation.method().clone();
        log_at!(self.level, method = %method, args = invocation.arguments().len(), "call started");

        let started = Instant::now();
        let result = next.proceed(invocation);
        let elapsed_us = started.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => log_at!(self.level, method = %method, elapsed_us, "call returned"),
            Err(err) => {
                let level = if self.level == Level::ERROR {
                    Level::ERROR
                } else {
                    Level::WARN
                };
                log_at!(level, method = %method, elapsed_us, error = %err, "call failed")
            }
        }
        result
    }
}
