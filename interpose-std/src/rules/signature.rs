//! Signature rules.

use interpose_core::{BoxError, MatchingRule, MethodDescriptor};

fn normalize(ty: &str) -> String {
    ty.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Matches methods returning the given type.
#[derive(Debug, Clone)]
pub struct ReturnTypeRule {
    ty: String,
}

impl ReturnTypeRule {
    /// Rule for return type `ty`. Whitespace is ignored when comparing.
    pub fn new(ty: &str) -> Self {
        Self { ty: normalize(ty) }
    }
}

impl MatchingRule for ReturnTypeRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(normalize(method.return_type()) == self.ty)
    }

    fn name(&self) -> &str {
        "return-type"
    }
}

/// Matches methods taking a parameter of the given type.
#[derive(Debug, Clone)]
pub struct ParameterTypeRule {
    ty: String,
    index: Option<usize>,
}

impl ParameterTypeRule {
    /// Any parameter of type `ty`.
    pub fn any(ty: &str) -> Self {
        Self {
            ty: normalize(ty),
            index: None,
        }
    }

    /// Parameter `index` of type `ty`.
    pub fn at(index: usize, ty: &str) -> Self {
        Self {
            ty: normalize(ty),
            index: Some(index),
        }
    }
}

impl MatchingRule for ParameterTypeRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        let params = method.parameters();
        let hit = match self.index {
            Some(i) => params.get(i).is_some_and(|p| normalize(p.ty()) == self.ty),
            None => params.iter().any(|p| normalize(p.ty()) == self.ty),
        };
        Ok(hit)
    }

    fn name(&self) -> &str {
        "parameter-type"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> MethodDescriptor {
        MethodDescriptor::builder("Bank", "transfer")
            .param("from", "AccountId")
            .param("amount", "u64")
            .returns("Result<Receipt, BankError>")
            .build()
    }

    #[test]
    fn return_type_ignores_whitespace() {
        let rule = ReturnTypeRule::new("Result< Receipt , BankError >");
        assert!(rule.matches(&transfer()).unwrap());
        assert!(!ReturnTypeRule::new("()").matches(&transfer()).unwrap());
    }

    #[test]
    fn parameter_type_any_and_positional() {
        assert!(ParameterTypeRule::any("u64").matches(&transfer()).unwrap());
        assert!(ParameterTypeRule::at(0, "AccountId").matches(&transfer()).unwrap());
        assert!(!ParameterTypeRule::at(0, "u64").matches(&transfer()).unwrap());
        assert!(!ParameterTypeRule::at(5, "u64").matches(&transfer()).unwrap());
    }
}
