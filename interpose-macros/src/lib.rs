//! Proc macros for `interpose`.
//!
//! - `#[interceptable]` - generates the contract marker and proxy adapter for a trait

use proc_macro::TokenStream;

mod interceptable;

/// Make a trait interceptable.
///
/// For a trait `Calculator` this generates, next to the trait:
///
/// - `CalculatorContract`: implements `interpose::Contract` (the method
///   descriptors) and `interpose::Intercept<T>` for every `T: Calculator`
/// - `CalculatorProxy<T>`: implements `Calculator` by sending each call
///   through its interception control, and `interpose::InterceptingProxy`
///
/// # Attributes
///
/// - `#[interceptable(name = "Calc")]`: descriptor type name (defaults to the trait name)
/// - on methods, `#[interpose(tag = "audit", getter, setter, no_policies)]`
/// - on parameters, `#[interpose(tag = "sensitive")]`
///
/// # Restrictions
///
/// Methods take `&self`, are neither generic nor `async`, and take owned
/// `Clone + Send + Sync + 'static` arguments (a handler may run the target
/// more than once). Supertraits are limited to `Send`, `Sync` and `'static`.
///
/// A method returning `Result<T, E>` reports chain errors through
/// `E: interpose::CallError`. Any other return type has no error channel:
/// if a handler or behavior fails such a call, the proxy method panics.
///
/// # Example
///
/// ```rust,ignore
/// #[interceptable]
/// pub trait Store: Send + Sync {
///     fn get(&self, key: String) -> Result<String, std::io::Error>;
///     #[interpose(tag = "audit")]
///     fn put(&self, #[interpose(tag = "sensitive")] key: String, value: String);
/// }
/// ```
#[proc_macro_attribute]
pub fn interceptable(attr: TokenStream, item: TokenStream) -> TokenStream {
    interceptable::interceptable_impl(attr, item)
}
