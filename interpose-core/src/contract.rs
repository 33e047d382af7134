//! Interceptable surfaces.
//!
//! A [`TypeDescriptor`] describes what an interceptor is asked to proxy: a
//! capability contract (a trait) with its methods, or a sealed concrete type
//! that exposes nothing to intercept. A [`Capability`] is an extra contract a
//! proxy exposes on top of the target's own.

use crate::method::MethodDescriptor;
use std::fmt;

/// What kind of type a [`TypeDescriptor`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A capability contract whose methods can be re-implemented by a proxy.
    Contract,
    /// A concrete type with no overridable surface.
    Sealed,
}

/// An extra contract a proxy exposes in addition to the target's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    name: String,
    methods: Vec<MethodDescriptor>,
}

impl Capability {
    /// Create a capability with no methods (a marker).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method to the capability.
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Capability name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods of the capability.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }
}

/// An ordered set of capabilities, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    items: Vec<Capability>,
}

impl CapabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capability. Returns `false` if one with the same name exists.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.contains(capability.name()) {
            return false;
        }
        self.items.push(capability);
        true
    }

    /// Insert every capability of `other` not already present.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Capability>) {
        for capability in other {
            self.insert(capability);
        }
    }

    /// Whether a capability called `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|c| c.name() == name)
    }

    /// Find the capability declaring `method`.
    pub fn owner_of(&self, method: &MethodDescriptor) -> Option<&Capability> {
        self.items.iter().find(|c| c.methods.contains(method))
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.items.iter()
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Description of a type offered for interception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    /// Describe a capability contract with the given methods.
    pub fn contract(name: impl Into<String>, methods: Vec<MethodDescriptor>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Contract,
            methods,
        }
    }

    /// Describe a sealed type.
    pub fn sealed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Sealed,
            methods: Vec::new(),
        }
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of type.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Methods a proxy would re-implement.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
