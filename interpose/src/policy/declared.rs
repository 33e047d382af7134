//! Declared policy.
//!
//! Handlers attached directly to a type, a method, a parameter or a tag,
//! without matching rules. Every [`PolicySet`](super::PolicySet) carries one
//! of these ahead of its explicit policies.

use super::InjectionPolicy;
use interpose_core::{CallHandler, ConfigurationError, MethodDescriptor};
use std::sync::Arc;

/// What a [`HandlerDeclaration`] is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationTarget {
    /// Every method declared by the named type.
    Type(String),
    /// One method of one type.
    Method {
        /// Declaring type.
        declaring_type: String,
        /// Method name.
        method: String,
    },
    /// One parameter of one method; applies to the whole method.
    Parameter {
        /// Declaring type.
        declaring_type: String,
        /// Method name.
        method: String,
        /// Parameter name.
        parameter: String,
    },
    /// Every method carrying the tag.
    Tag(String),
    /// Every method with at least one parameter carrying the tag.
    ParameterTag(String),
}

impl DeclarationTarget {
    /// Whether the declaration applies to `method`.
    pub fn applies_to(&self, method: &MethodDescriptor) -> bool {
        match self {
            Self::Type(ty) => method.declaring_type() == ty,
            Self::Method {
                declaring_type,
                method: name,
            } => method.declaring_type() == declaring_type && method.name() == name,
            Self::Parameter {
                declaring_type,
                method: name,
                parameter,
            } => {
                method.declaring_type() == declaring_type
                    && method.name() == name
                    && method.parameter_index(parameter).is_some()
            }
            Self::Tag(tag) => method.has_tag(tag),
            Self::ParameterTag(tag) => method
                .parameters()
                .iter()
                .any(|p| p.tags().iter().any(|t| t == tag)),
        }
    }
}

/// A handler attached to a [`DeclarationTarget`].
#[derive(Clone)]
pub struct HandlerDeclaration {
    target: DeclarationTarget,
    handler: Arc<dyn CallHandler>,
}

impl HandlerDeclaration {
    /// Attach `handler` to `target`.
    pub fn new(target: DeclarationTarget, handler: impl CallHandler) -> Self {
        Self::shared(target, Arc::new(handler))
    }

    /// Attach a shared handler to `target`.
    pub fn shared(target: DeclarationTarget, handler: Arc<dyn CallHandler>) -> Self {
        Self { target, handler }
    }

    /// Where the handler applies.
    pub fn target(&self) -> &DeclarationTarget {
        &self.target
    }

    /// The declared handler.
    pub fn handler(&self) -> &Arc<dyn CallHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for HandlerDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDeclaration")
            .field("target", &self.target)
            .field("order", &self.handler.order())
            .finish()
    }
}

/// The implicit policy built from [`HandlerDeclaration`]s.
///
/// Handlers are contributed in declaration order. An empty declared policy
/// never applies.
#[derive(Clone, Debug, Default)]
pub struct DeclaredPolicy {
    declarations: Vec<HandlerDeclaration>,
}

impl DeclaredPolicy {
    /// Name reported for the implicit policy.
    pub const NAME: &'static str = "declared";

    /// A policy with no declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a declared policy.
    pub fn builder() -> DeclaredPolicyBuilder {
        DeclaredPolicyBuilder::default()
    }

    /// All declarations, in order.
    pub fn declarations(&self) -> &[HandlerDeclaration] {
        &self.declarations
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl FromIterator<HandlerDeclaration> for DeclaredPolicy {
    fn from_iter<I: IntoIterator<Item = HandlerDeclaration>>(iter: I) -> Self {
        Self {
            declarations: iter.into_iter().collect(),
        }
    }
}

impl InjectionPolicy for DeclaredPolicy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handlers_for(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Vec<Arc<dyn CallHandler>>, ConfigurationError> {
        Ok(self
            .declarations
            .iter()
            .filter(|d| d.target.applies_to(method))
            .map(|d| d.handler.clone())
            .collect())
    }
}

/// Builder for [`DeclaredPolicy`].
#[derive(Default)]
pub struct DeclaredPolicyBuilder {
    declarations: Vec<HandlerDeclaration>,
}

impl DeclaredPolicyBuilder {
    /// Add a prepared declaration.
    pub fn declare(mut self, declaration: HandlerDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Attach `handler` to every method of `declaring_type`.
    pub fn on_type(self, declaring_type: impl Into<String>, handler: impl CallHandler) -> Self {
        self.declare(HandlerDeclaration::new(
            DeclarationTarget::Type(declaring_type.into()),
            handler,
        ))
    }

    /// Attach `handler` to `declaring_type::method`.
    pub fn on_method(
        self,
        declaring_type: impl Into<String>,
        method: impl Into<String>,
        handler: impl CallHandler,
    ) -> Self {
        self.declare(HandlerDeclaration::new(
            DeclarationTarget::Method {
                declaring_type: declaring_type.into(),
                method: method.into(),
            },
            handler,
        ))
    }

    /// Attach `handler` through a parameter of `declaring_type::method`.
    pub fn on_parameter(
        self,
        declaring_type: impl Into<String>,
        method: impl Into<String>,
        parameter: impl Into<String>,
        handler: impl CallHandler,
    ) -> Self {
        self.declare(HandlerDeclaration::new(
            DeclarationTarget::Parameter {
                declaring_type: declaring_type.into(),
                method: method.into(),
                parameter: parameter.into(),
            },
            handler,
        ))
    }

    /// Attach `handler` to every method tagged `tag`.
    pub fn on_tag(self, tag: impl Into<String>, handler: impl CallHandler) -> Self {
        self.declare(HandlerDeclaration::new(
            DeclarationTarget::Tag(tag.into()),
            handler,
        ))
    }

    /// Attach `handler` to every method with a parameter tagged `tag`.
    pub fn on_parameter_tag(self, tag: impl Into<String>, handler: impl CallHandler) -> Self {
        self.declare(HandlerDeclaration::new(
            DeclarationTarget::ParameterTag(tag.into()),
            handler,
        ))
    }

    /// Freeze the declarations.
    pub fn build(self) -> DeclaredPolicy {
        DeclaredPolicy {
            declarations: self.declarations,
        }
    }
}

// ============================================================================
// Link-time collection
// ============================================================================

/// A declaration submitted with [`inventory::submit!`].
///
/// # Example
/// ```ignore
/// inventory::submit! {
///     DeclarationSubmission {
///         declare: || HandlerDeclaration::new(
///             DeclarationTarget::Tag("audit".into()),
///             LoggingHandler::default(),
///         ),
///     }
/// }
/// ```
#[cfg(feature = "inventory")]
pub struct DeclarationSubmission {
    /// Produces the declaration.
    pub declare: fn() -> HandlerDeclaration,
}

#[cfg(feature = "inventory")]
inventory::collect!(DeclarationSubmission);

#[cfg(feature = "inventory")]
impl DeclaredPolicy {
    /// Build a policy from every [`DeclarationSubmission`] linked into the binary.
    ///
    /// Submission order across crates is unspecified.
    pub fn from_submissions() -> Self {
        inventory::iter::<DeclarationSubmission>
            .into_iter()
            .map(|s| (s.declare)())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interpose_core::Parameter;
    use interpose_std::testing::CountingHandler;

    fn method2() -> MethodDescriptor {
        MethodDescriptor::builder("Wrappable", "method2")
            .parameter(Parameter::new("key", "String").with_tag("sensitive"))
            .tag("audit")
            .build()
    }

    #[test]
    fn targets_select_their_methods() {
        let m = method2();
        assert!(DeclarationTarget::Type("Wrappable".into()).applies_to(&m));
        assert!(!DeclarationTarget::Type("Other".into()).applies_to(&m));
        assert!(
            DeclarationTarget::Method {
                declaring_type: "Wrappable".into(),
                method: "method2".into(),
            }
            .applies_to(&m)
        );
        assert!(
            DeclarationTarget::Parameter {
                declaring_type: "Wrappable".into(),
                method: "method2".into(),
                parameter: "key".into(),
            }
            .applies_to(&m)
        );
        assert!(
            !DeclarationTarget::Parameter {
                declaring_type: "Wrappable".into(),
                method: "method2".into(),
                parameter: "value".into(),
            }
            .applies_to(&m)
        );
        assert!(DeclarationTarget::Tag("audit".into()).applies_to(&m));
        assert!(DeclarationTarget::ParameterTag("sensitive".into()).applies_to(&m));
        assert!(!DeclarationTarget::ParameterTag("audit".into()).applies_to(&m));
    }

    #[test]
    fn handlers_follow_declaration_order() {
        let policy = DeclaredPolicy::builder()
            .on_tag("audit", CountingHandler::with_order(2))
            .on_type("Other", CountingHandler::with_order(9))
            .on_method("Wrappable", "method2", CountingHandler::with_order(1))
            .build();

        let orders: Vec<i32> = policy
            .handlers_for(&method2())
            .unwrap()
            .iter()
            .map(|h| h.order())
            .collect();
        assert_eq!(orders, vec![2, 1]);
    }

    #[test]
    fn empty_declared_policy_never_applies() {
        let policy = DeclaredPolicy::new();
        assert!(policy.is_empty());
        assert!(policy.handlers_for(&method2()).unwrap().is_empty());
    }
}
