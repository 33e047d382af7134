//! # Per-call record (Invocation)
//!
//! An [`Invocation`] is built by a proxy for every call and threaded through
//! the behavior chain and the handler pipeline. It is owned by the call in
//! progress; concurrent calls always get independent invocations.
//!
//! Arguments are type-erased so that handlers can inspect and rewrite them
//! before forwarding. The outcome of a call is a [`MethodResult`]: the
//! `Ok` side holds the (type-erased) return value, the `Err` side holds the
//! error raised by the target, a handler or a behavior.

use crate::{
    error::{ArgumentError, BoxError},
    method::MethodDescriptor,
};
use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// Outcome of one pass through (part of) an interception chain.
pub type MethodResult = Result<ReturnValue, BoxError>;

/// A type-erased return value.
pub struct ReturnValue(Box<dyn Any + Send>);

impl ReturnValue {
    /// Wrap a value.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The return value of a method returning `()`.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Whether the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrow the value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Take the value out as a `T`, or get `self` back if it is something else.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        self.0.downcast::<T>().map(|v| *v).map_err(Self)
    }
}

impl fmt::Debug for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReturnValue").finish_non_exhaustive()
    }
}

/// Positional, type-erased argument values of a call.
#[derive(Default)]
pub struct Arguments {
    values: Vec<Box<dyn Any + Send + Sync>>,
}

impl Arguments {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument (builder style).
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Append an argument.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slot(&self, index: usize) -> Result<&(dyn Any + Send + Sync), ArgumentError> {
        self.values
            .get(index)
            .map(|v| &**v)
            .ok_or(ArgumentError::OutOfRange {
                index,
                len: self.values.len(),
            })
    }

    /// Borrow argument `index` as a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, ArgumentError> {
        self.slot(index)?
            .downcast_ref::<T>()
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Mutably borrow argument `index` as a `T`.
    pub fn get_mut<T: Any>(&mut self, index: usize) -> Result<&mut T, ArgumentError> {
        let len = self.values.len();
        self.values
            .get_mut(index)
            .ok_or(ArgumentError::OutOfRange { index, len })?
            .downcast_mut::<T>()
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Clone argument `index` out as a `T`.
    ///
    /// Proxies read arguments this way so that a chain may reach the target
    /// more than once (e.g. retries) with the same, possibly rewritten, values.
    pub fn cloned<T: Any + Clone>(&self, index: usize) -> Result<T, ArgumentError> {
        self.get::<T>(index).cloned()
    }

    /// Replace argument `index`. The new value must have the same type.
    pub fn set<T: Any + Send + Sync>(&mut self, index: usize, value: T) -> Result<(), ArgumentError> {
        *self.get_mut::<T>(index)? = value;
        Ok(())
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}

/// The per-call record threaded through behaviors and handlers.
pub struct Invocation {
    method: MethodDescriptor,
    arguments: Arguments,
    target: Arc<dyn Any + Send + Sync>,
    context: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Invocation {
    /// Create an invocation of `method` on `target`.
    pub fn new(
        method: MethodDescriptor,
        arguments: Arguments,
        target: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            method,
            arguments,
            target,
            context: HashMap::new(),
        }
    }

    /// The method being called.
    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// The call's arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// The call's arguments, for rewriting before forwarding.
    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.arguments
    }

    /// Borrow the argument bound to parameter `name`.
    pub fn argument<T: Any>(&self, name: &str) -> Result<&T, ArgumentError> {
        let index = self.parameter_index(name)?;
        self.arguments.get(index)
    }

    /// Replace the argument bound to parameter `name`.
    pub fn set_argument<T: Any + Send + Sync>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), ArgumentError> {
        let index = self.parameter_index(name)?;
        self.arguments.set(index, value)
    }

    fn parameter_index(&self, name: &str) -> Result<usize, ArgumentError> {
        self.method
            .parameter_index(name)
            .ok_or_else(|| ArgumentError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// The real target, type-erased.
    pub fn target(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.target
    }

    /// Borrow the real target as a `T`.
    pub fn target_as<T: Any>(&self) -> Option<&T> {
        self.target.downcast_ref::<T>()
    }

    /// Store a value in the per-call context.
    pub fn insert_context<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.context.insert(key.into(), Box::new(value));
    }

    /// Read a value from the per-call context.
    pub fn context<T: Any>(&self, key: &str) -> Option<&T> {
        self.context.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove a value from the per-call context.
    pub fn remove_context(&mut self, key: &str) -> bool {
        self.context.remove(key).is_some()
    }

    /// Build a successful result carrying `value`.
    pub fn return_value<T: Any + Send>(&self, value: T) -> MethodResult {
        Ok(ReturnValue::new(value))
    }

    /// Build a failed result carrying `err`.
    pub fn raise(&self, err: impl Into<BoxError>) -> MethodResult {
        Err(err.into())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method.to_string())
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        let method = MethodDescriptor::builder("Greeter", "greet")
            .param("name", "String")
            .param("times", "u32")
            .returns("String")
            .build();
        Invocation::new(
            method,
            Arguments::new().with("ada".to_string()).with(2u32),
            Arc::new(()),
        )
    }

    #[test]
    fn arguments_by_name_and_position() {
        let inv = invocation();
        assert_eq!(inv.argument::<String>("name").unwrap(), "ada");
        assert_eq!(*inv.arguments().get::<u32>(1).unwrap(), 2);
    }

    #[test]
    fn rewrite_argument() {
        let mut inv = invocation();
        inv.set_argument("times", 5u32).unwrap();
        assert_eq!(inv.arguments().cloned::<u32>(1).unwrap(), 5);
    }

    #[test]
    fn rewrite_with_wrong_type_is_rejected() {
        let mut inv = invocation();
        let err = inv.set_argument("times", "five").unwrap_err();
        assert!(matches!(err, ArgumentError::TypeMismatch { index: 1, .. }));
    }

    #[test]
    fn unknown_parameter_and_out_of_range() {
        let inv = invocation();
        assert_eq!(
            inv.argument::<u32>("count").unwrap_err(),
            ArgumentError::UnknownParameter {
                name: "count".into()
            }
        );
        assert_eq!(
            inv.arguments().get::<u32>(9).unwrap_err(),
            ArgumentError::OutOfRange { index: 9, len: 2 }
        );
    }

    #[test]
    fn context_round_trip() {
        let mut inv = invocation();
        inv.insert_context("started", 42u64);
        assert_eq!(inv.context::<u64>("started"), Some(&42));
        assert!(inv.remove_context("started"));
        assert_eq!(inv.context::<u64>("started"), None);
    }

    #[test]
    fn return_value_downcast() {
        let inv = invocation();
        let value = inv.return_value(String::from("hi")).unwrap();
        assert!(value.is::<String>());
        let value = value.downcast::<u32>().unwrap_err();
        assert_eq!(value.downcast::<String>().unwrap(), "hi");
    }
}
