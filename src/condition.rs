//! Condition evaluator
//!
//! Gates a declaration on its predicates. Every predicate is resolved and its
//! signature checked before the type's static initializer runs, and the
//! initializer always runs before the first predicate is called.
//!
//! Accepted shapes:
//! - legacy named references: static, no parameters, returns `bool`
//! - condition-marked members: static, returns `bool`, no parameters or a
//!   single `&Configuration`

use crate::config::Configuration;
use crate::errors::{ResolveError, Result, SignatureFault};
use crate::metadata::{
    ConditionDescriptor, Member, MemberKind, Receiver, RegistrationDeclaration, TypeDescriptor,
    TypeKey,
};
use std::any::Any;

/// A predicate whose shape has been checked
struct Predicate<'a> {
    member: &'a Member,
    takes_configuration: bool,
}

pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Returns whether `declaration` should be registered.
    ///
    /// A declaration without conditions is always accepted. Evaluation stops at
    /// the first predicate returning `false`.
    pub fn evaluate(
        ty: &TypeDescriptor,
        declaration: &RegistrationDeclaration,
        configuration: &Configuration,
    ) -> Result<bool> {
        let predicates = Self::resolve_predicates(ty, declaration)?;

        ty.ensure_initialized();

        for predicate in &predicates {
            let passed = Self::invoke(ty, predicate, configuration)?;
            tracing::trace!(
                type_name = ty.name(),
                condition = predicate.member.name(),
                passed,
                "Condition evaluated"
            );
            if !passed {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Resolves every condition of `declaration` and checks its shape without
    /// calling anything.
    pub fn check_signatures(ty: &TypeDescriptor, declaration: &RegistrationDeclaration) -> Result<()> {
        Self::resolve_predicates(ty, declaration).map(|_| ())
    }

    fn resolve_predicates<'a>(
        ty: &'a TypeDescriptor,
        declaration: &RegistrationDeclaration,
    ) -> Result<Vec<Predicate<'a>>> {
        declaration
            .conditions
            .iter()
            .map(|condition| {
                Self::resolve(ty, condition).map_err(|fault| ResolveError::InvalidConditionSignature {
                    type_key: ty.key(),
                    member: condition.member_name().to_string(),
                    fault,
                })
            })
            .collect()
    }

    fn resolve<'a>(
        ty: &'a TypeDescriptor,
        condition: &ConditionDescriptor,
    ) -> std::result::Result<Predicate<'a>, SignatureFault> {
        match condition {
            ConditionDescriptor::NamedMethod(name) => Self::resolve_named(ty, name, MemberKind::Method),
            ConditionDescriptor::NamedProperty(name) => {
                Self::resolve_named(ty, name, MemberKind::Property)
            }
            ConditionDescriptor::Marked { member, index } => {
                let found = ty
                    .member(*index)
                    .filter(|found| found.name() == member && found.has_condition_marker())
                    .ok_or(SignatureFault::NotFound)?;
                Self::check_static_bool(found)?;

                let parameters = &found.signature().parameters;
                match parameters.as_slice() {
                    [] => Ok(Predicate {
                        member: found,
                        takes_configuration: false,
                    }),
                    [only] if only.is::<Configuration>() => Ok(Predicate {
                        member: found,
                        takes_configuration: true,
                    }),
                    _ => Err(SignatureFault::Parameters {
                        found: parameters.clone(),
                    }),
                }
            }
        }
    }

    fn resolve_named<'a>(
        ty: &'a TypeDescriptor,
        name: &str,
        kind: MemberKind,
    ) -> std::result::Result<Predicate<'a>, SignatureFault> {
        let candidates: Vec<&'a Member> = ty.members_named(name, kind).map(|(_, member)| member).collect();
        let matching: Vec<&'a Member> = candidates
            .iter()
            .copied()
            .filter(|member| Self::check_nullary_bool(member).is_ok())
            .collect();

        let member = match matching.as_slice() {
            [member] => *member,
            // 没有合格成员：只有一个同名成员时报告它的具体问题
            [] => {
                return Err(match candidates.as_slice() {
                    [only] => Self::check_nullary_bool(only)
                        .err()
                        .unwrap_or(SignatureFault::NotFound),
                    _ => SignatureFault::NotFound,
                })
            }
            many => return Err(SignatureFault::Ambiguous { count: many.len() }),
        };

        Ok(Predicate {
            member,
            takes_configuration: false,
        })
    }

    fn check_nullary_bool(member: &Member) -> std::result::Result<(), SignatureFault> {
        Self::check_static_bool(member)?;
        let parameters = &member.signature().parameters;
        if !parameters.is_empty() {
            return Err(SignatureFault::Parameters {
                found: parameters.clone(),
            });
        }
        Ok(())
    }

    fn check_static_bool(member: &Member) -> std::result::Result<(), SignatureFault> {
        if member.receiver() != Receiver::Static {
            return Err(SignatureFault::NotStatic);
        }
        let returns = member.signature().returns;
        if !returns.is::<bool>() {
            return Err(SignatureFault::ReturnType { found: returns });
        }
        Ok(())
    }

    fn invoke(ty: &TypeDescriptor, predicate: &Predicate<'_>, configuration: &Configuration) -> Result<bool> {
        let result = if predicate.takes_configuration {
            predicate.member.invoke(&[configuration as &dyn Any])
        } else {
            predicate.member.invoke(&[])
        };

        result
            .and_then(|value| value.downcast::<bool>().ok())
            .map(|value| *value)
            .ok_or_else(|| ResolveError::InvalidConditionSignature {
                type_key: ty.key(),
                member: predicate.member.name().to_string(),
                fault: SignatureFault::ReturnType {
                    found: TypeKey::of::<()>(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::LegacyMarker;
    use crate::resolver::AttributeResolver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Feature;

    fn evaluate(ty: &TypeDescriptor, configuration: &Configuration) -> Result<bool> {
        let declaration = AttributeResolver::resolve(ty)?.expect("type is declared");
        ConditionEvaluator::evaluate(ty, &declaration, configuration)
    }

    fn fault_of(result: Result<bool>) -> SignatureFault {
        match result {
            Err(ResolveError::InvalidConditionSignature { fault, .. }) => fault,
            other => panic!("expected invalid signature, got {:?}", other),
        }
    }

    #[test]
    fn test_no_conditions_is_accepted() {
        let ty = TypeDescriptor::builder::<Feature>().transient().build();
        assert!(evaluate(&ty, &Configuration::new()).unwrap());
    }

    #[test]
    fn test_short_circuits_on_first_false() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());

        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .condition("a", move || {
                a.lock().unwrap().push("a");
                true
            })
            .condition("b", move || {
                b.lock().unwrap().push("b");
                false
            })
            .condition("c", move || {
                c.lock().unwrap().push("c");
                true
            })
            .build();

        assert!(!evaluate(&ty, &Configuration::new()).unwrap());
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_configuration_is_passed_through() {
        let ty = TypeDescriptor::builder::<Feature>()
            .scoped()
            .condition("enabled", |config: &Configuration| {
                config.get_bool("features.enabled").unwrap_or(false)
            })
            .build();

        let on = Configuration::new().with("features.enabled", true);
        assert!(evaluate(&ty, &on).unwrap());
        assert!(!evaluate(&ty, &Configuration::new()).unwrap());
    }

    #[test]
    fn test_marked_member_with_other_parameter_is_rejected() {
        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .condition("threshold", |limit: &u32| *limit > 1)
            .build();

        match fault_of(evaluate(&ty, &Configuration::new())) {
            SignatureFault::Parameters { found } => assert_eq!(found, vec![TypeKey::of::<u32>()]),
            other => panic!("unexpected fault {:?}", other),
        }

        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .condition("pair", |_: &Configuration, _: &Configuration| true)
            .build();
        assert!(matches!(
            fault_of(evaluate(&ty, &Configuration::new())),
            SignatureFault::Parameters { .. }
        ));
    }

    #[test]
    fn test_marked_member_must_return_bool_and_be_static() {
        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .condition("count", || 3u32)
            .build();
        assert!(matches!(
            fault_of(evaluate(&ty, &Configuration::new())),
            SignatureFault::ReturnType { .. }
        ));

        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .member(Member::method("enabled", || true).condition().instance())
            .build();
        assert_eq!(fault_of(evaluate(&ty, &Configuration::new())), SignatureFault::NotStatic);
    }

    #[test]
    fn test_signatures_checked_before_any_predicate_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .condition("valid", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .condition("invalid", |_: &String| true)
            .build();

        assert!(evaluate(&ty, &Configuration::new()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_check_signatures_does_not_initialize() {
        let ty = TypeDescriptor::builder::<Feature>()
            .singleton()
            .initializer(|| {})
            .condition("enabled", |_: &Configuration| true)
            .build();
        let declaration = AttributeResolver::resolve(&ty).unwrap().unwrap();

        assert!(ConditionEvaluator::check_signatures(&ty, &declaration).is_ok());
        assert!(!ty.is_initialized());
    }

    #[test]
    fn test_initializer_runs_before_first_predicate() {
        let ready = Arc::new(AtomicUsize::new(0));
        let (init, check) = (ready.clone(), ready.clone());

        let ty = TypeDescriptor::builder::<Feature>()
            .transient()
            .initializer(move || {
                init.store(1, Ordering::SeqCst);
            })
            .condition("ready", move || check.load(Ordering::SeqCst) == 1)
            .build();

        assert!(evaluate(&ty, &Configuration::new()).unwrap());
    }

    #[test]
    fn test_initializer_runs_without_predicates() {
        let ty = TypeDescriptor::builder::<Feature>()
            .transient()
            .initializer(|| {})
            .build();

        assert!(!ty.is_initialized());
        assert!(evaluate(&ty, &Configuration::new()).unwrap());
        assert!(ty.is_initialized());
    }

    #[test]
    fn test_legacy_method_and_property_must_both_hold() {
        let build = |method: bool, property: bool| {
            TypeDescriptor::builder::<Feature>()
                .marker(
                    LegacyMarker::singleton()
                        .condition_method("Check")
                        .condition_property("IsLoaded"),
                )
                .member(Member::method("Check", move || method))
                .member(Member::property("IsLoaded", move || property))
                .build()
        };

        let config = Configuration::new();
        assert!(evaluate(&build(true, true), &config).unwrap());
        assert!(!evaluate(&build(true, false), &config).unwrap());
        assert!(!evaluate(&build(false, true), &config).unwrap());
    }

    #[test]
    fn test_legacy_named_member_faults() {
        let missing = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::singleton().condition_method("Check"))
            .member(Member::property("Check", || true))
            .build();
        assert_eq!(fault_of(evaluate(&missing, &Configuration::new())), SignatureFault::NotFound);

        let ambiguous = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::singleton().condition_method("Check"))
            .member(Member::method("Check", || true))
            .member(Member::method("Check", || false))
            .build();
        assert_eq!(
            fault_of(evaluate(&ambiguous, &Configuration::new())),
            SignatureFault::Ambiguous { count: 2 }
        );

        let not_static = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::singleton().condition_property("IsLoaded"))
            .member(Member::property("IsLoaded", || true).instance())
            .build();
        assert_eq!(fault_of(evaluate(&not_static, &Configuration::new())), SignatureFault::NotStatic);

        let with_parameter = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::singleton().condition_method("Check"))
            .member(Member::method("Check", |_: &Configuration| true))
            .build();
        assert!(matches!(
            fault_of(evaluate(&with_parameter, &Configuration::new())),
            SignatureFault::Parameters { .. }
        ));
    }

    #[test]
    fn test_legacy_overload_with_parameter_is_skipped() {
        let ty = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::singleton().condition_method("Check"))
            .member(Member::method("Check", || true))
            .member(Member::method("Check", |_: &Configuration| false))
            .build();

        assert!(evaluate(&ty, &Configuration::new()).unwrap());
    }

    #[test]
    fn test_legacy_ignores_marked_members() {
        let ty = TypeDescriptor::builder::<Feature>()
            .marker(LegacyMarker::transient())
            .condition("never", || false)
            .build();

        assert!(evaluate(&ty, &Configuration::new()).unwrap());
    }
}
