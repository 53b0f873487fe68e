//! Attribute resolver
//!
//! Turns the markers attached to a type into at most one
//! [`RegistrationDeclaration`].

use crate::errors::{ResolveError, Result};
use crate::metadata::{ConditionDescriptor, Marker, MarkerShape, RegistrationDeclaration, TypeDescriptor};

pub struct AttributeResolver;

impl AttributeResolver {
    /// Resolves the declaration of `ty`.
    ///
    /// Returns `Ok(None)` when the type carries no marker and
    /// [`ResolveError::DuplicateDeclaration`] when it carries more than one.
    pub fn resolve(ty: &TypeDescriptor) -> Result<Option<RegistrationDeclaration>> {
        match ty.markers() {
            [] => Ok(None),
            [marker] => Ok(Some(Self::declaration_from(ty, marker))),
            markers => Err(ResolveError::DuplicateDeclaration {
                type_key: ty.key(),
                markers: markers.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    fn declaration_from(ty: &TypeDescriptor, marker: &Marker) -> RegistrationDeclaration {
        let decorated = ty.key();

        let (service, implementation, conditions) = match marker.shape() {
            MarkerShape::SelfContracted { service } => {
                (*service, *service, Self::marked_conditions(ty))
            }
            MarkerShape::Abstracted {
                implementation,
                service,
            } => (*service, *implementation, Self::marked_conditions(ty)),
            MarkerShape::Legacy {
                service,
                condition_method,
                condition_property,
            } => {
                // 旧形式：方法条件在前，属性条件在后
                let conditions = condition_method
                    .iter()
                    .map(|name| ConditionDescriptor::NamedMethod(name.clone()))
                    .chain(
                        condition_property
                            .iter()
                            .map(|name| ConditionDescriptor::NamedProperty(name.clone())),
                    )
                    .collect();
                (service.unwrap_or(decorated), decorated, conditions)
            }
        };

        RegistrationDeclaration {
            decorated,
            lifetime: marker.lifetime(),
            service,
            implementation,
            conditions,
            marker: marker.to_string(),
        }
    }

    fn marked_conditions(ty: &TypeDescriptor) -> Vec<ConditionDescriptor> {
        ty.condition_members()
            .map(|(index, member)| ConditionDescriptor::Marked {
                member: member.name().to_string(),
                index,
            })
            .collect()
    }
}
