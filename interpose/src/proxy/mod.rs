//! Proxies.
//!
//! A proxy implements a contract trait by packaging each call into an
//! [`Invocation`](interpose_core::Invocation) and sending it through its
//! [`InterceptionControl`]. The adapters themselves are generated by
//! `#[interceptable]`; this module holds what they share.

mod contract;
mod control;
mod factory;

pub use contract::{Contract, Intercept};
pub use control::{InterceptingProxy, InterceptionControl};
pub use factory::ProxyFactory;
