use super::TypeKey;
use crate::infrastructure::container::ServiceLifetime;
use std::fmt;

/// Shape of a declaration marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerShape {
    /// `Singleton<T>`: the service type is also the implementation type
    SelfContracted { service: TypeKey },
    /// `Singleton<TImpl, TContract>`
    Abstracted {
        implementation: TypeKey,
        service: TypeKey,
    },
    /// Older non-generic form with optional service type and named conditions
    Legacy {
        service: Option<TypeKey>,
        condition_method: Option<String>,
        condition_property: Option<String>,
    },
}

/// A registration marker attached to a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    lifetime: ServiceLifetime,
    shape: MarkerShape,
}

impl Marker {
    pub fn new(lifetime: ServiceLifetime, shape: MarkerShape) -> Self {
        Self { lifetime, shape }
    }

    pub fn singleton<T: ?Sized + 'static>() -> Self {
        Self::self_contracted::<T>(ServiceLifetime::Singleton)
    }

    pub fn scoped<T: ?Sized + 'static>() -> Self {
        Self::self_contracted::<T>(ServiceLifetime::Scoped)
    }

    pub fn transient<T: ?Sized + 'static>() -> Self {
        Self::self_contracted::<T>(ServiceLifetime::Transient)
    }

    pub fn singleton_as<TImpl: 'static, TContract: ?Sized + 'static>() -> Self {
        Self::abstracted::<TImpl, TContract>(ServiceLifetime::Singleton)
    }

    pub fn scoped_as<TImpl: 'static, TContract: ?Sized + 'static>() -> Self {
        Self::abstracted::<TImpl, TContract>(ServiceLifetime::Scoped)
    }

    pub fn transient_as<TImpl: 'static, TContract: ?Sized + 'static>() -> Self {
        Self::abstracted::<TImpl, TContract>(ServiceLifetime::Transient)
    }

    fn self_contracted<T: ?Sized + 'static>(lifetime: ServiceLifetime) -> Self {
        Self::new(
            lifetime,
            MarkerShape::SelfContracted {
                service: TypeKey::of::<T>(),
            },
        )
    }

    fn abstracted<TImpl: 'static, TContract: ?Sized + 'static>(lifetime: ServiceLifetime) -> Self {
        Self::new(
            lifetime,
            MarkerShape::Abstracted {
                implementation: TypeKey::of::<TImpl>(),
                service: TypeKey::of::<TContract>(),
            },
        )
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    pub fn shape(&self) -> &MarkerShape {
        &self.shape
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            MarkerShape::SelfContracted { service } => write!(f, "{}<{}>", self.lifetime, service),
            MarkerShape::Abstracted {
                implementation,
                service,
            } => write!(f, "{}<{}, {}>", self.lifetime, implementation, service),
            MarkerShape::Legacy {
                service,
                condition_method,
                condition_property,
            } => {
                let mut arguments = Vec::new();
                if let Some(service) = service {
                    arguments.push(format!("ServiceType = {}", service));
                }
                if let Some(method) = condition_method {
                    arguments.push(format!("ConditionMethod = \"{}\"", method));
                }
                if let Some(property) = condition_property {
                    arguments.push(format!("ConditionProperty = \"{}\"", property));
                }
                if arguments.is_empty() {
                    write!(f, "{}", self.lifetime)
                } else {
                    write!(f, "{}({})", self.lifetime, arguments.join(", "))
                }
            }
        }
    }
}

/// Builder for the legacy marker form.
///
/// ```rust,ignore
/// let marker = LegacyMarker::scoped()
///     .service_type::<dyn Mailer>()
///     .condition_property("IsLoaded");
/// ```
#[derive(Debug, Clone)]
pub struct LegacyMarker {
    lifetime: ServiceLifetime,
    service: Option<TypeKey>,
    condition_method: Option<String>,
    condition_property: Option<String>,
}

impl LegacyMarker {
    pub fn new(lifetime: ServiceLifetime) -> Self {
        Self {
            lifetime,
            service: None,
            condition_method: None,
            condition_property: None,
        }
    }

    pub fn singleton() -> Self {
        Self::new(ServiceLifetime::Singleton)
    }

    pub fn scoped() -> Self {
        Self::new(ServiceLifetime::Scoped)
    }

    pub fn transient() -> Self {
        Self::new(ServiceLifetime::Transient)
    }

    pub fn service_type<T: ?Sized + 'static>(mut self) -> Self {
        self.service = Some(TypeKey::of::<T>());
        self
    }

    pub fn condition_method(mut self, name: impl Into<String>) -> Self {
        self.condition_method = Some(name.into());
        self
    }

    pub fn condition_property(mut self, name: impl Into<String>) -> Self {
        self.condition_property = Some(name.into());
        self
    }
}

impl From<LegacyMarker> for Marker {
    fn from(legacy: LegacyMarker) -> Self {
        Marker::new(
            legacy.lifetime,
            MarkerShape::Legacy {
                service: legacy.service,
                condition_method: legacy.condition_method,
                condition_property: legacy.condition_property,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter {}
    struct Hello;

    #[test]
    fn test_marker_names() {
        let marker = Marker::singleton::<Hello>();
        assert!(marker.to_string().starts_with("Singleton<"));

        let marker = Marker::scoped_as::<Hello, dyn Greeter>();
        let name = marker.to_string();
        assert!(name.starts_with("Scoped<"));
        assert!(name.contains("Hello"));
        assert!(name.contains("Greeter"));

        let marker: Marker = LegacyMarker::transient().into();
        assert_eq!(marker.to_string(), "Transient");

        let marker: Marker = LegacyMarker::transient().condition_method("Check").into();
        assert_eq!(marker.to_string(), "Transient(ConditionMethod = \"Check\")");
    }

    #[test]
    fn test_legacy_builder_fills_shape() {
        let marker: Marker = LegacyMarker::singleton()
            .service_type::<dyn Greeter>()
            .condition_method("Check")
            .condition_property("IsLoaded")
            .into();

        assert_eq!(marker.lifetime(), ServiceLifetime::Singleton);
        match marker.shape() {
            MarkerShape::Legacy {
                service,
                condition_method,
                condition_property,
            } => {
                assert_eq!(*service, Some(TypeKey::of::<dyn Greeter>()));
                assert_eq!(condition_method.as_deref(), Some("Check"));
                assert_eq!(condition_property.as_deref(), Some("IsLoaded"));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }
}
