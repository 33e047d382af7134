//! # interpose-core
//!
//! Core traits for the Interpose method interception framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! rule, handler and behavior authors who don't need the full `interpose`
//! facade.
//!
//! # Roles
//!
//! A proxied call travels through two nested chains before reaching the
//! real target:
//!
//! ## Behaviors ([`InterceptionBehavior`])
//!
//! Links wrapping *every* call made through a proxy. They are attached once,
//! before the proxy serves its first call.
//!
//! ## Call handlers ([`CallHandler`])
//!
//! Links selected *per method*. Policies pair [`MatchingRule`]s with
//! handlers; the handlers of all matching policies run sorted by
//! [`CallHandler::order`].
//!
//! ## Matching rules ([`MatchingRule`])
//!
//! Pure predicates over a [`MethodDescriptor`].
//!
//! Each link receives a [`Next`] for the rest of its chain and may call it
//! once, never (short-circuit) or repeatedly (retry).
//!
//! # Error Types
//!
//! - [`InterceptError`] - Top-level error type
//! - [`ConfigurationError`] - Setup problems, reported to the configurer
//! - [`ArgumentError`] - Argument access problems
//! - [`BoxError`] - Carrier for runtime call errors, never wrapped

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod chain;
mod contract;
mod error;
mod handler;
mod interceptor;
mod invocation;
mod method;
mod resolver;
mod rule;

// Re-exports
pub use behavior::InterceptionBehavior;
pub use chain::{Continuation, Next};
pub use contract::{Capability, CapabilitySet, TypeDescriptor, TypeKind};
pub use error::{
    ArgumentError, BoxError, CallError, ConfigurationError, InterceptError, restore,
};
pub use handler::{CallHandler, Ordered};
pub use interceptor::{ContractInterceptor, Interceptor, ProxyShape};
pub use invocation::{Arguments, Invocation, MethodResult, ReturnValue};
pub use method::{MethodDescriptor, MethodDescriptorBuilder, MethodFlags, Parameter};
pub use resolver::{NoResolver, Resolver};
pub use rule::MatchingRule;
