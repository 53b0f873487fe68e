use crate::infrastructure::container::{ContainerAdapter, ServiceLifetime};
use crate::metadata::{RegistrationDeclaration, TypeKey};

/// Registration handed to the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationDescriptor {
    pub service: TypeKey,
    pub implementation: TypeKey,
    pub lifetime: ServiceLifetime,
}

impl From<&RegistrationDeclaration> for RegistrationDescriptor {
    fn from(declaration: &RegistrationDeclaration) -> Self {
        Self {
            service: declaration.service,
            implementation: declaration.implementation,
            lifetime: declaration.lifetime,
        }
    }
}

/// Emits accepted declarations to a container.
///
/// Declarations reaching the registrar are already validated and accepted.
pub struct Registrar;

impl Registrar {
    pub fn register(
        declaration: &RegistrationDeclaration,
        container: &mut dyn ContainerAdapter,
    ) -> RegistrationDescriptor {
        let descriptor = RegistrationDescriptor::from(declaration);

        match descriptor.lifetime {
            ServiceLifetime::Singleton => {
                container.add_singleton(descriptor.service, descriptor.implementation)
            }
            ServiceLifetime::Scoped => container.add_scoped(descriptor.service, descriptor.implementation),
            ServiceLifetime::Transient => {
                container.add_transient(descriptor.service, descriptor.implementation)
            }
        }

        tracing::debug!(
            service = %descriptor.service,
            implementation = %descriptor.implementation,
            lifetime = %descriptor.lifetime,
            "Service registered"
        );

        descriptor
    }
}
