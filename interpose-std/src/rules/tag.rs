//! Tag, flag and property rules.

use super::name::{PatternError, Wildcard};
use interpose_core::{BoxError, MatchingRule, MethodDescriptor, MethodFlags};

/// Matches methods carrying a tag.
#[derive(Debug, Clone)]
pub struct TagRule {
    tag: String,
    ignore_case: bool,
}

impl TagRule {
    /// Case-sensitive tag rule.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ignore_case: false,
        }
    }

    /// Compare tags ignoring ASCII case.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

impl MatchingRule for TagRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(method.tags().iter().any(|t| {
            if self.ignore_case {
                t.eq_ignore_ascii_case(&self.tag)
            } else {
                *t == self.tag
            }
        }))
    }

    fn name(&self) -> &str {
        "tag"
    }
}

/// Matches methods by structural flags.
#[derive(Debug, Clone, Copy)]
pub struct FlagsRule {
    flags: MethodFlags,
    require_all: bool,
}

impl FlagsRule {
    /// Methods carrying every flag in `flags`.
    pub fn all(flags: MethodFlags) -> Self {
        Self {
            flags,
            require_all: true,
        }
    }

    /// Methods carrying at least one flag in `flags`.
    pub fn any(flags: MethodFlags) -> Self {
        Self {
            flags,
            require_all: false,
        }
    }
}

impl MatchingRule for FlagsRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        Ok(if self.require_all {
            method.flags().contains(self.flags)
        } else {
            method.flags().intersects(self.flags)
        })
    }

    fn name(&self) -> &str {
        "flags"
    }
}

/// Which accessors a [`PropertyRule`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccess {
    /// Getters only.
    Get,
    /// Setters only.
    Set,
    /// Both.
    GetOrSet,
}

/// Matches property accessors by property name.
///
/// The property name of a getter is the method name without a `get_` prefix;
/// of a setter, without the `set_` prefix.
#[derive(Debug, Clone)]
pub struct PropertyRule {
    pattern: Wildcard,
    access: PropertyAccess,
}

impl PropertyRule {
    /// Rule for properties matching `pattern`.
    pub fn new(pattern: &str, access: PropertyAccess) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: Wildcard::new(pattern, false)?,
            access,
        })
    }
}

impl MatchingRule for PropertyRule {
    fn matches(&self, method: &MethodDescriptor) -> Result<bool, BoxError> {
        let flags = method.flags();
        let name = method.name();
        let property = if flags.contains(MethodFlags::GETTER) && self.access != PropertyAccess::Set
        {
            name.strip_prefix("get_").unwrap_or(name)
        } else if flags.contains(MethodFlags::SETTER) && self.access != PropertyAccess::Get {
            name.strip_prefix("set_").unwrap_or(name)
        } else {
            return Ok(false);
        };
        Ok(self.pattern.is_match(property))
    }

    fn name(&self) -> &str {
        "property"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn getter(name: &str) -> MethodDescriptor {
        MethodDescriptor::builder("Person", name)
            .flags(MethodFlags::GETTER)
            .build()
    }

    fn setter(name: &str) -> MethodDescriptor {
        MethodDescriptor::builder("Person", name)
            .flags(MethodFlags::SETTER)
            .build()
    }

    #[test]
    fn tag_rule_case_handling() {
        let m = MethodDescriptor::builder("T", "m").tag("Audit").build();
        assert!(!TagRule::new("audit").matches(&m).unwrap());
        assert!(TagRule::new("audit").ignore_case().matches(&m).unwrap());
    }

    #[test]
    fn flags_rule_all_vs_any() {
        let m = getter("name");
        assert!(FlagsRule::any(MethodFlags::PROPERTY).matches(&m).unwrap());
        assert!(!FlagsRule::all(MethodFlags::PROPERTY).matches(&m).unwrap());
    }

    #[test]
    fn property_rule_respects_access() {
        let rule = PropertyRule::new("name", PropertyAccess::Set).unwrap();
        assert!(rule.matches(&setter("set_name")).unwrap());
        assert!(!rule.matches(&getter("name")).unwrap());

        let rule = PropertyRule::new("na*", PropertyAccess::GetOrSet).unwrap();
        assert!(rule.matches(&getter("get_name")).unwrap());
        assert!(rule.matches(&setter("set_name")).unwrap());
        assert!(!rule.matches(&MethodDescriptor::builder("Person", "name").build()).unwrap());
    }
}
