//! Standard call handlers.

mod func;
mod logging;

pub use func::{FnHandler, handler_fn};
pub use logging::LoggingHandler;
