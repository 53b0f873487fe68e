//! Declarative service registration.
//!
//! Types describe how they want to be registered (lifetime, contract, gating
//! conditions) through [`TypeDescriptor`]s. A scan resolves, validates and
//! evaluates those descriptions and hands the accepted ones to a container.
//!
//! ```rust,ignore
//! use di_scan::{AddAttributedServices, Configuration, ScanUnit, ServiceCollection, TypeDescriptor};
//!
//! let unit = ScanUnit::new("app")
//!     .with_type(TypeDescriptor::builder::<SmtpMailer>()
//!         .singleton_as::<dyn Mailer>(|mailer| mailer)
//!         .condition("smtp_configured", |config: &Configuration| config.contains("smtp.host"))
//!         .build());
//!
//! let mut services = ServiceCollection::new();
//! services.add_attributed_services_of(&configuration, &unit)?;
//! ```

pub mod condition;
pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;
pub mod metadata;
pub mod registrar;
pub mod resolver;
pub mod scan;
pub mod scanner;
pub mod validator;

// Re-export commonly used items for convenience
pub use condition::ConditionEvaluator;
pub use config::{ConfigLoader, Configuration, ErrorPolicy, ScanConfig};
pub use errors::{ConfigError, ResolveError, SignatureFault};
pub use infrastructure::{ContainerAdapter, ServiceCollection, ServiceLifetime};
pub use metadata::{
    ConditionDescriptor, LegacyMarker, Marker, MarkerShape, Member, RegistrationDeclaration,
    TypeDescriptor, TypeKey,
};
pub use registrar::{Registrar, RegistrationDescriptor};
pub use resolver::AttributeResolver;
pub use scan::{AddAttributedServices, ScanReport, ServiceScan, TypeOutcome};
pub use scanner::{ScanUnit, TypeScanner};
pub use validator::CompatibilityValidator;
