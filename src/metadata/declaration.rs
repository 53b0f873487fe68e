use super::TypeKey;
use crate::infrastructure::container::ServiceLifetime;
use std::fmt;

/// Reference from a declaration to one of its gating predicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionDescriptor {
    /// Legacy form: a static method looked up by name
    NamedMethod(String),
    /// Legacy form: a static property looked up by name
    NamedProperty(String),
    /// A member carrying the condition marker, by position on the type
    Marked { member: String, index: usize },
}

impl ConditionDescriptor {
    pub fn member_name(&self) -> &str {
        match self {
            ConditionDescriptor::NamedMethod(name) | ConditionDescriptor::NamedProperty(name) => name,
            ConditionDescriptor::Marked { member, .. } => member,
        }
    }
}

impl fmt::Display for ConditionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionDescriptor::NamedMethod(name) => write!(f, "method '{}'", name),
            ConditionDescriptor::NamedProperty(name) => write!(f, "property '{}'", name),
            ConditionDescriptor::Marked { member, .. } => write!(f, "condition '{}'", member),
        }
    }
}

/// The resolved registration intent of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDeclaration {
    /// The type that carries the marker
    pub decorated: TypeKey,
    pub lifetime: ServiceLifetime,
    /// The contract consumers request
    pub service: TypeKey,
    /// The type the container instantiates
    pub implementation: TypeKey,
    /// Gating predicates; empty means unconditional
    pub conditions: Vec<ConditionDescriptor>,
    /// Display name of the marker the declaration came from
    pub marker: String,
}

impl RegistrationDeclaration {
    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn is_abstracted(&self) -> bool {
        self.service != self.implementation
    }
}
