//! # interpose-std
//!
//! Standard implementations for the Interpose interception framework.
//!
//! This crate provides:
//! - **Matching rules**: member name, declaring type, signature, tag, flag and
//!   property rules plus [`AllOf`](rules::AllOf) / [`AnyOf`](rules::AnyOf) /
//!   [`Not`](rules::Not) combinators
//! - **Call handlers**: [`LoggingHandler`](handlers::LoggingHandler), closure handlers
//! - **Behaviors**: Tracing, Conditional, Retry, Fallback
//! - **Resolution**: [`StaticResolver`](resolver::StaticResolver)
//! - **Testing**: counting / recording doubles

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use interpose_core;

// Modules
pub mod behaviors;
pub mod handlers;
pub mod resolver;
pub mod rules;
pub mod testing;
