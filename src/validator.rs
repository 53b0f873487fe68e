use crate::errors::{ResolveError, Result};
use crate::metadata::{RegistrationDeclaration, TypeDescriptor};

/// Type-shape checks of a declaration
pub struct CompatibilityValidator;

impl CompatibilityValidator {
    /// Checks that the declared implementation is the decorated type itself and
    /// that it fulfils the declared service contract. Stops at the first failure.
    pub fn validate(ty: &TypeDescriptor, declaration: &RegistrationDeclaration) -> Result<()> {
        if declaration.implementation != ty.key() {
            return Err(ResolveError::ActualTypeMismatch {
                decorated: ty.key(),
                declared: declaration.implementation,
            });
        }

        if !ty.is_assignable_to(declaration.service) {
            return Err(ResolveError::ServiceContractUnmet {
                decorated: ty.key(),
                service: declaration.service,
            });
        }

        Ok(())
    }
}
