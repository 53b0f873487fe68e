//! Registration metadata model
//!
//! Describes the types under scan the way attributes and reflection would:
//! - `TypeKey`: identity of a type or contract
//! - `Marker`: a lifetime declaration attached to a type
//! - `Member`: static methods/properties with their signatures
//! - `TypeDescriptor`: everything known about one type
//! - `RegistrationDeclaration`: the resolved intent of one type

pub mod declaration;
pub mod descriptor;
pub mod marker;
pub mod member;
pub mod type_key;

pub use declaration::{ConditionDescriptor, RegistrationDeclaration};
pub use descriptor::{StaticInitializer, TypeDescriptor, TypeDescriptorBuilder};
pub use marker::{LegacyMarker, Marker, MarkerShape};
pub use member::{Invoker, Member, MemberFn, MemberKind, MemberSignature, Receiver};
pub use type_key::TypeKey;
