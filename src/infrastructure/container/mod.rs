//! Container adapter
//!
//! The IoC container itself lives outside this crate. The resolver only talks
//! to it through [`ContainerAdapter`]; [`ServiceCollection`] is the in-process
//! recording implementation.

use crate::metadata::TypeKey;
use crate::registrar::RegistrationDescriptor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceLifetime {
    /// Single instance for the entire application lifetime
    Singleton,
    /// Per-scope instance (shared within active scope)
    Scoped,
    /// New instance per resolve
    Transient,
}

impl fmt::Display for ServiceLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceLifetime::Singleton => f.write_str("Singleton"),
            ServiceLifetime::Scoped => f.write_str("Scoped"),
            ServiceLifetime::Transient => f.write_str("Transient"),
        }
    }
}

/// Entry points of the external container, one per lifetime.
pub trait ContainerAdapter {
    fn add_singleton(&mut self, service: TypeKey, implementation: TypeKey);

    fn add_scoped(&mut self, service: TypeKey, implementation: TypeKey);

    fn add_transient(&mut self, service: TypeKey, implementation: TypeKey);
}

/// Records registrations in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<RegistrationDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, service: TypeKey, implementation: TypeKey, lifetime: ServiceLifetime) {
        self.descriptors.push(RegistrationDescriptor {
            service,
            implementation,
            lifetime,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistrationDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether any registration serves `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.find::<T>().is_some()
    }

    /// Lifetime of the last registration serving `T`
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<ServiceLifetime> {
        self.find::<T>().map(|descriptor| descriptor.lifetime)
    }

    /// Implementation of the last registration serving `T`
    pub fn implementation_of<T: ?Sized + 'static>(&self) -> Option<TypeKey> {
        self.find::<T>().map(|descriptor| descriptor.implementation)
    }

    /// Number of registrations with the given lifetime
    pub fn count(&self, lifetime: ServiceLifetime) -> usize {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.lifetime == lifetime)
            .count()
    }

    // 与常见容器一致：同一服务多次注册时，最后一次生效
    fn find<T: ?Sized + 'static>(&self) -> Option<&RegistrationDescriptor> {
        let service = TypeKey::of::<T>();
        self.descriptors
            .iter()
            .rev()
            .find(|descriptor| descriptor.service == service)
    }
}

impl ContainerAdapter for ServiceCollection {
    fn add_singleton(&mut self, service: TypeKey, implementation: TypeKey) {
        self.push(service, implementation, ServiceLifetime::Singleton);
    }

    fn add_scoped(&mut self, service: TypeKey, implementation: TypeKey) {
        self.push(service, implementation, ServiceLifetime::Scoped);
    }

    fn add_transient(&mut self, service: TypeKey, implementation: TypeKey) {
        self.push(service, implementation, ServiceLifetime::Transient);
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a RegistrationDescriptor;
    type IntoIter = std::slice::Iter<'a, RegistrationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
