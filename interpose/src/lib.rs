//! # interpose - Aspect-Oriented Method Interception
//!
//! `interpose` places a proxy in front of a target object. Every call made
//! through the proxy is packaged as an [`Invocation`] and runs through two
//! chains before (and possibly instead of) reaching the target:
//!
//! - the **behavior chain**: behaviors attached to the proxy, applied to all
//!   of its methods
//! - the **handler pipeline**: call handlers selected per method by
//!   [`Policy`] matching rules, sorted by ascending order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use interpose::prelude::*;
//! use interpose::handlers::LoggingHandler;
//! use interpose::rules::MemberNameRule;
//!
//! #[interceptable]
//! pub trait Calculator: Send + Sync {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! let policies = PolicySet::builder()
//!     .policy(
//!         Policy::builder("logging")
//!             .rule(MemberNameRule::new("add")?)
//!             .handler(LoggingHandler::default())
//!             .build()?,
//!     )
//!     .build();
//!
//! let interception = Interception::builder().policies(policies).build()?;
//! let calc = interception.wrap::<CalculatorContract, _>(RealCalculator)?;
//! assert_eq!(calc.add(2, 3), 5);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod behavior;
mod interception;
pub mod pipeline;
pub mod policy;
pub mod proxy;

pub use interpose_core::{
    // Data model
    Arguments,
    // Errors
    ArgumentError,
    BoxError,
    CallError,
    // Roles
    CallHandler,
    // Surface
    Capability,
    CapabilitySet,
    ConfigurationError,
    Continuation,
    ContractInterceptor,
    InterceptError,
    InterceptionBehavior,
    Interceptor,
    Invocation,
    MatchingRule,
    MethodDescriptor,
    MethodDescriptorBuilder,
    MethodFlags,
    MethodResult,
    Next,
    NoResolver,
    Ordered,
    Parameter,
    ProxyShape,
    Resolver,
    ReturnValue,
    TypeDescriptor,
    TypeKind,
    restore,
};

pub use behavior::{EffectiveBehaviorChain, PolicyInjectionBehavior};
pub use interception::{
    BehaviorRef, Intercepted, Interception, InterceptionBuilder, InterceptorRef, PreparedProxy,
};
pub use pipeline::{HandlerPipeline, PipelineCache};
pub use policy::{
    DeclarationTarget, DeclaredPolicy, HandlerDeclaration, InjectionPolicy, Policy, PolicyBuilder,
    PolicySet,
};
pub use proxy::{Contract, Intercept, InterceptingProxy, InterceptionControl, ProxyFactory};

/// Standard matching rules.
pub mod rules {
    #![allow(clippy::wildcard_imports)]
    pub use interpose_std::rules::*;
}

/// Standard call handlers.
pub mod handlers {
    #![allow(clippy::wildcard_imports)]
    pub use interpose_std::handlers::*;
}

/// Standard interception behaviors.
pub mod behaviors {
    #![allow(clippy::wildcard_imports)]
    pub use interpose_std::behaviors::*;
}

/// Map-backed resolver for named references.
pub use interpose_std::resolver::{ResolverError, StaticResolver};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use interpose_std::testing::*;
}

/// Prelude module - common imports for interpose.
///
/// # Usage
///
/// ```rust,ignore
/// use interpose::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, CallHandler, ConfigurationError, Contract, InterceptError,
        InterceptingProxy, Interception, InterceptionBehavior, Invocation, MatchingRule,
        MethodDescriptor, MethodResult, Next, Policy, PolicySet, ReturnValue,
    };

    #[cfg(feature = "macros")]
    pub use crate::interceptable;
}

#[cfg(feature = "macros")]
pub use interpose_macros::interceptable;

#[cfg(feature = "inventory")]
pub use inventory;

#[cfg(feature = "inventory")]
pub use policy::DeclarationSubmission;

/// Support code for `#[interceptable]`. Not public API.
#[doc(hidden)]
pub mod __private {
    use interpose_core::{CallError, InterceptError, MethodDescriptor, MethodResult};
    use std::any::{Any, type_name};

    pub use std::sync::{Arc, OnceLock};

    /// Unpack the result of an infallible contract method.
    ///
    /// # Panics
    ///
    /// If the chain produced an error or a value of the wrong type; an
    /// infallible signature has no way to report either.
    pub fn infallible<T: Any>(result: MethodResult, method: &MethodDescriptor) -> T {
        match result {
            Ok(value) => match value.downcast::<T>() {
                Ok(value) => value,
                Err(_) => panic!(
                    "intercepted call to `{method}` returned a value that is not `{}`",
                    type_name::<T>()
                ),
            },
            Err(err) => panic!("intercepted call to infallible method `{method}` failed: {err}"),
        }
    }

    /// Unpack the result of a contract method returning `Result<T, E>`.
    pub fn fallible<T: Any, E: CallError>(
        result: MethodResult,
        method: &MethodDescriptor,
    ) -> Result<T, E> {
        match result {
            Ok(value) => value.downcast::<T>().map_err(|_| {
                E::from_box(Box::new(InterceptError::ReturnType {
                    method: method.to_string(),
                    expected: type_name::<T>(),
                }))
            }),
            Err(err) => Err(E::from_box(err)),
        }
    }
}
