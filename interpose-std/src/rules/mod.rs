//! Standard matching rules.

mod combinators;
mod name;
mod signature;
mod tag;

pub use combinators::{AllOf, AnyOf, Always, Never, Not};
pub use name::{DeclaringTypeRule, MemberNameRule, PatternError, Wildcard};
pub use signature::{ParameterTypeRule, ReturnTypeRule};
pub use tag::{FlagsRule, PropertyAccess, PropertyRule, TagRule};
