//! Method identity.
//!
//! A [`MethodDescriptor`] names one interceptable method: its declaring type,
//! name, parameter list, return type, tags and flags. Descriptors are
//! immutable, cheap to clone, and used both as the input to matching rules and
//! as the key of the handler pipeline cache.

use bitflags::bitflags;
use std::{fmt, sync::Arc};

bitflags! {
    /// Structural facts about a method that rules may match on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        /// The method has type parameters.
        const GENERIC = 1;
        /// The method reads a property.
        const GETTER = 1 << 1;
        /// The method writes a property.
        const SETTER = 1 << 2;
        /// Either kind of property accessor.
        const PROPERTY = Self::GETTER.bits() | Self::SETTER.bits();
        /// No policy contributes handlers to this method.
        const NO_POLICIES = 1 << 3;
    }
}

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    ty: String,
    tags: Vec<String>,
}

impl Parameter {
    /// Create a parameter with no tags.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag to the parameter.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type, as written in the contract.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Tags attached to the parameter.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct MethodInner {
    declaring_type: String,
    name: String,
    parameters: Vec<Parameter>,
    return_type: String,
    tags: Vec<String>,
    flags: MethodFlags,
}

/// Immutable identity of an interceptable method.
///
/// Two descriptors are equal when every part of the signature, the tags and
/// the flags are equal.
///
/// # Example
///
/// ```rust
/// use interpose_core::{MethodDescriptor, MethodFlags};
///
/// let method = MethodDescriptor::builder("Account", "balance")
///     .returns("u64")
///     .flags(MethodFlags::GETTER)
///     .build();
///
/// assert_eq!(method.to_string(), "Account::balance() -> u64");
/// assert!(method.is_property_accessor());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor(Arc<MethodInner>);

impl MethodDescriptor {
    /// Start describing `declaring_type::name`.
    pub fn builder(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
    ) -> MethodDescriptorBuilder {
        MethodDescriptorBuilder {
            inner: MethodInner {
                declaring_type: declaring_type.into(),
                name: name.into(),
                parameters: Vec::new(),
                return_type: "()".to_string(),
                tags: Vec::new(),
                flags: MethodFlags::empty(),
            },
        }
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Name of the type (or contract) declaring the method.
    pub fn declaring_type(&self) -> &str {
        &self.0.declaring_type
    }

    /// Declared parameters, in order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.0.parameters
    }

    /// Position of the parameter called `name`.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.0.parameters.iter().position(|p| p.name == name)
    }

    /// Return type, as written in the contract.
    pub fn return_type(&self) -> &str {
        &self.0.return_type
    }

    /// Tags attached to the method.
    pub fn tags(&self) -> &[String] {
        &self.0.tags
    }

    /// Whether the method carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.0.tags.iter().any(|t| t == tag)
    }

    /// Structural flags.
    pub fn flags(&self) -> MethodFlags {
        self.0.flags
    }

    /// Whether the method has type parameters.
    pub fn is_generic(&self) -> bool {
        self.0.flags.contains(MethodFlags::GENERIC)
    }

    /// Whether the method reads or writes a property.
    pub fn is_property_accessor(&self) -> bool {
        self.0.flags.intersects(MethodFlags::PROPERTY)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.0.declaring_type, self.0.name)?;
        for (i, p) in self.0.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&p.ty)?;
        }
        write!(f, ") -> {}", self.0.return_type)
    }
}

/// Builder for [`MethodDescriptor`].
#[derive(Debug)]
pub struct MethodDescriptorBuilder {
    inner: MethodInner,
}

impl MethodDescriptorBuilder {
    /// Append a parameter.
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.inner.parameters.push(Parameter::new(name, ty));
        self
    }

    /// Append a fully described parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.inner.parameters.push(parameter);
        self
    }

    /// Set the return type. Defaults to `()`.
    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.inner.return_type = ty.into();
        self
    }

    /// Attach a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.inner.tags.push(tag.into());
        self
    }

    /// Add structural flags.
    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.inner.flags |= flags;
        self
    }

    /// Freeze the descriptor.
    pub fn build(self) -> MethodDescriptor {
        MethodDescriptor(Arc::new(self.inner))
    }
}
