use crate::metadata::TypeKey;
use thiserror::Error;

/// Why a condition member was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureFault {
    #[error("no matching member was found")]
    NotFound,
    #[error("{count} members share this name")]
    Ambiguous { count: usize },
    #[error("the member is not static")]
    NotStatic,
    #[error("expected a bool return type, found {found}")]
    ReturnType { found: TypeKey },
    #[error("unsupported parameter list ({})", format_parameters(.found))]
    Parameters { found: Vec<TypeKey> },
}

fn format_parameters(parameters: &[TypeKey]) -> String {
    parameters
        .iter()
        .map(TypeKey::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration-time errors raised while resolving registrations.
///
/// None of them are retryable: a malformed declaration is a programming error.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Multiple dependency injection markers present on {type_key}: {}", .markers.join(", "))]
    DuplicateDeclaration {
        type_key: TypeKey,
        markers: Vec<String>,
    },
    #[error("The actual type {declared} does not match the decorated type {decorated}")]
    ActualTypeMismatch { decorated: TypeKey, declared: TypeKey },
    #[error("The type {decorated} does not implement the service type {service}")]
    ServiceContractUnmet { decorated: TypeKey, service: TypeKey },
    #[error("The condition member {type_key}.{member} has an invalid signature: {fault}")]
    InvalidConditionSignature {
        type_key: TypeKey,
        member: String,
        fault: SignatureFault,
    },
    #[error("{} types failed to resolve:\n{}", .0.len(), format_errors(.0))]
    Aggregate(Vec<ResolveError>),
}

fn format_errors(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(|error| format!("  - {}", error))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ResolveError {
    /// The type the error is about; `None` for aggregates
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            ResolveError::DuplicateDeclaration { type_key, .. }
            | ResolveError::InvalidConditionSignature { type_key, .. } => Some(*type_key),
            ResolveError::ActualTypeMismatch { decorated, .. }
            | ResolveError::ServiceContractUnmet { decorated, .. } => Some(*decorated),
            ResolveError::Aggregate(_) => None,
        }
    }

    /// Flattens aggregates into their individual errors
    pub fn errors(&self) -> Vec<&ResolveError> {
        match self {
            ResolveError::Aggregate(errors) => errors.iter().flat_map(ResolveError::errors).collect(),
            other => vec![other],
        }
    }
}

/// Errors raised while loading scan settings or parsing a configuration object
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;
    trait Gadget {}

    #[test]
    fn test_messages_name_the_types() {
        let error = ResolveError::ServiceContractUnmet {
            decorated: TypeKey::of::<Widget>(),
            service: TypeKey::of::<dyn Gadget>(),
        };
        let message = error.to_string();
        assert!(message.contains("Widget"));
        assert!(message.contains("Gadget"));

        let error = ResolveError::DuplicateDeclaration {
            type_key: TypeKey::of::<Widget>(),
            markers: vec!["Singleton<Widget>".to_string(), "Scoped<Widget>".to_string()],
        };
        assert!(error.to_string().ends_with("Singleton<Widget>, Scoped<Widget>"));
    }

    #[test]
    fn test_signature_fault_messages() {
        let fault = SignatureFault::Parameters {
            found: vec![TypeKey::of::<u32>(), TypeKey::of::<String>()],
        };
        assert!(fault.to_string().contains("u32"));
        assert_eq!(SignatureFault::Ambiguous { count: 2 }.to_string(), "2 members share this name");
    }

    #[test]
    fn test_aggregate_flattens() {
        let error = ResolveError::Aggregate(vec![
            ResolveError::ActualTypeMismatch {
                decorated: TypeKey::of::<Widget>(),
                declared: TypeKey::of::<u8>(),
            },
            ResolveError::Aggregate(vec![ResolveError::ServiceContractUnmet {
                decorated: TypeKey::of::<Widget>(),
                service: TypeKey::of::<dyn Gadget>(),
            }]),
        ]);

        assert_eq!(error.errors().len(), 2);
        assert_eq!(error.type_key(), None);
        assert!(error.to_string().starts_with("2 types failed to resolve"));
    }
}
