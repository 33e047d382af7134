//! Error types for Interpose.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`InterceptError`] - Top-level error type for all Interpose operations
//! - [`ConfigurationError`] - Problems detected while building policies or proxies
//! - [`ArgumentError`] - Problems reading or rewriting invocation arguments
//!
//! Errors raised by a target method, a handler or a behavior during a live
//! call are carried as [`BoxError`] and are never wrapped by the framework.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Interpose operations.
#[derive(Error, Debug)]
pub enum InterceptError {
    /// The interception setup is invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An invocation argument could not be read or replaced.
    #[error("argument error: {0}")]
    Argument(#[from] ArgumentError),

    /// A behavior or handler produced a return value of the wrong type.
    #[error("method `{method}` returned a value that is not `{expected}`")]
    ReturnType {
        /// Display form of the method.
        method: String,
        /// Name of the expected return type.
        expected: &'static str,
    },

    /// No behavior served a method that has no implementation on the target.
    #[error("method `{method}` is not implemented by the target")]
    NotImplemented {
        /// Display form of the method.
        method: String,
    },

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors reported to whoever configures interception.
///
/// A proxy is not usable until these are fixed.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A policy was registered without a name.
    #[error("policy name must not be empty")]
    EmptyPolicyName,

    /// A matching rule was referenced by a name nothing resolves.
    #[error("policy `{policy}`: no matching rule registered as `{name}`")]
    UnresolvedRule {
        /// Owning policy.
        policy: String,
        /// The unresolved name.
        name: String,
    },

    /// A call handler was referenced by a name nothing resolves.
    #[error("policy `{policy}`: no call handler registered as `{name}`")]
    UnresolvedHandler {
        /// Owning policy.
        policy: String,
        /// The unresolved name.
        name: String,
    },

    /// A rule or handler reference was empty.
    #[error("policy `{policy}`: empty {kind} reference")]
    MissingReference {
        /// Owning policy.
        policy: String,
        /// `"matching rule"` or `"call handler"`.
        kind: &'static str,
    },

    /// A matching rule failed while being evaluated.
    #[error("matching rule `{rule}` failed on `{method}`")]
    RuleFailed {
        /// Name of the failing rule.
        rule: String,
        /// Display form of the method being matched.
        method: String,
        /// The error the rule raised.
        #[source]
        source: BoxError,
    },

    /// A behavior was added to a proxy that already served a call.
    #[error("cannot add an interception behavior to `{contract}` after its first call")]
    BehaviorAfterFirstCall {
        /// Name of the proxied contract.
        contract: String,
    },

    /// The selected interceptor cannot intercept the requested type.
    #[error("interceptor `{interceptor}` cannot intercept `{contract}`")]
    Declined {
        /// Name of the type that was to be intercepted.
        contract: String,
        /// Name of the interceptor.
        interceptor: String,
    },

    /// An interceptor was referenced by a name nothing resolves.
    #[error("no interceptor registered as `{name}`")]
    UnresolvedInterceptor {
        /// The unresolved name.
        name: String,
    },

    /// A behavior was referenced by a name nothing resolves.
    #[error("no interception behavior registered as `{name}`")]
    UnresolvedBehavior {
        /// The unresolved name.
        name: String,
    },

    /// A capability method was called that the proxy does not expose.
    #[error("method `{method}` belongs to no capability of this proxy")]
    UnknownCapabilityMethod {
        /// Display form of the method.
        method: String,
    },
}

/// Errors reading or rewriting invocation arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No argument at the requested position.
    #[error("argument index {index} out of range (len {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of arguments.
        len: usize,
    },

    /// The argument is not of the requested type.
    #[error("argument {index} is not a `{expected}`")]
    TypeMismatch {
        /// Requested index.
        index: usize,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// No parameter with the requested name.
    #[error("no parameter named `{name}`")]
    UnknownParameter {
        /// The requested name.
        name: String,
    },
}

impl From<BoxError> for InterceptError {
    fn from(err: BoxError) -> Self {
        InterceptError::Custom(err)
    }
}

// ============================================================================
// CallError - bridging contract error types and the BoxError carrier
// ============================================================================

/// An error type that may appear as `E` in an intercepted method returning
/// `Result<T, E>`.
///
/// Errors cross the interception chain as [`BoxError`]. `into_box` is used when
/// the target fails; `from_box` rebuilds `E` at the proxy boundary. Implementors
/// should downcast first (see [`restore`]) so the target's own error reaches the
/// caller unchanged, and only map foreign errors raised by handlers or behaviors.
///
/// # Example
///
/// ```rust
/// use interpose_core::{BoxError, CallError, restore};
///
/// #[derive(Debug, thiserror::Error)]
/// enum StoreError {
///     #[error("missing key")]
///     Missing,
///     #[error(transparent)]
///     Intercepted(BoxError),
/// }
///
/// impl CallError for StoreError {
///     fn into_box(self) -> BoxError {
///         Box::new(self)
///     }
///     fn from_box(err: BoxError) -> Self {
///         restore(err, StoreError::Intercepted)
///     }
/// }
/// ```
pub trait CallError: Sized + Send + 'static {
    /// Convert into the chain's error carrier.
    fn into_box(self) -> BoxError;

    /// Rebuild from the chain's error carrier.
    fn from_box(err: BoxError) -> Self;
}

/// Downcast `err` back to `E`, or hand it to `fallback` when it is some other error.
pub fn restore<E>(err: BoxError, fallback: impl FnOnce(BoxError) -> E) -> E
where
    E: std::error::Error + Send + Sync + 'static,
{
    match err.downcast::<E>() {
        Ok(original) => *original,
        Err(other) => fallback(other),
    }
}

impl CallError for BoxError {
    fn into_box(self) -> BoxError {
        self
    }

    fn from_box(err: BoxError) -> Self {
        err
    }
}

impl CallError for std::io::Error {
    fn into_box(self) -> BoxError {
        Box::new(self)
    }

    fn from_box(err: BoxError) -> Self {
        restore(err, std::io::Error::other)
    }
}

impl CallError for InterceptError {
    fn into_box(self) -> BoxError {
        Box::new(self)
    }

    fn from_box(err: BoxError) -> Self {
        restore(err, InterceptError::Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_returns_original_error_unchanged() {
        let original = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let boxed = original.into_box();
        let back = std::io::Error::from_box(boxed);
        assert_eq!(back.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(back.to_string(), "gone");
    }

    #[test]
    fn restore_maps_foreign_errors_through_fallback() {
        let foreign: BoxError = Box::new(ArgumentError::UnknownParameter { name: "x".into() });
        let back = InterceptError::from_box(foreign);
        assert!(matches!(back, InterceptError::Custom(_)));
        assert_eq!(back.to_string(), "no parameter named `x`");
    }

    #[test]
    fn configuration_error_display() {
        let err = ConfigurationError::UnresolvedRule {
            policy: "Policy1".into(),
            name: "rule1".into(),
        };
        assert_eq!(
            err.to_string(),
            "policy `Policy1`: no matching rule registered as `rule1`"
        );
    }
}
