//! Standard interception behaviors.

mod conditional;
mod fallback;
mod func;
mod retry;
mod tracing;

pub use conditional::ConditionalBehavior;
pub use fallback::FallbackBehavior;
pub use func::{FnBehavior, behavior_fn};
pub use retry::RetryBehavior;
pub use tracing::TracingBehavior;
