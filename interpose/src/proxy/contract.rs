//! Contract traits implemented by generated code.

use super::{InterceptingProxy, InterceptionControl};
use interpose_core::TypeDescriptor;
use std::sync::Arc;

/// A contract (trait) whose calls can be intercepted.
///
/// Implemented by the marker type `#[interceptable]` generates next to the
/// trait.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an interceptable contract",
    label = "not a contract marker",
    note = "Annotate the trait with `#[interceptable]` and use the generated `<Trait>Contract` type."
)]
pub trait Contract: 'static {
    /// The trait object type, e.g. `dyn Calculator`.
    type Object: ?Sized;

    /// Description of the contract's methods.
    fn descriptor() -> &'static TypeDescriptor;
}

/// Wraps targets of type `T` into proxies for this contract.
pub trait Intercept<T>: Contract {
    /// The generated adapter type.
    type Proxy: InterceptingProxy + 'static;

    /// Build a proxy around `target`.
    fn proxy(target: Arc<T>, control: Arc<InterceptionControl>) -> Self::Proxy;

    /// Erase a proxy to the contract's trait object.
    fn proxy_object(proxy: Self::Proxy) -> Box<Self::Object>;

    /// Erase an unproxied target to the contract's trait object.
    fn target_object(target: T) -> Box<Self::Object>;
}
