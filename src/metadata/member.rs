//! Member metadata for the types under scan
//!
//! A member is a named function (or property getter) declared on a type. Its
//! signature is captured from the Rust closure it is built from, so the
//! condition evaluator can check shapes at scan time and then call it through a
//! type-erased invoker.

use super::TypeKey;
use std::any::Any;
use std::fmt;

/// Type-erased call into a member body.
///
/// Returns `None` when the argument list does not match the captured signature.
pub type Invoker = Box<dyn Fn(&[&dyn Any]) -> Option<Box<dyn Any>> + Send + Sync>;

/// Closures and functions that can back a [`Member`].
///
/// Implemented for `Fn() -> R`, `Fn(&A) -> R` and `Fn(&A, &B) -> R`. The `Args`
/// parameter only exists to keep the implementations apart.
pub trait MemberFn<Args>: Send + Sync + 'static {
    fn parameters() -> Vec<TypeKey>;

    fn returns() -> TypeKey;

    fn into_invoker(self) -> Invoker;
}

impl<F, R> MemberFn<((), R)> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: 'static,
{
    fn parameters() -> Vec<TypeKey> {
        Vec::new()
    }

    fn returns() -> TypeKey {
        TypeKey::of::<R>()
    }

    fn into_invoker(self) -> Invoker {
        Box::new(move |args| {
            if !args.is_empty() {
                return None;
            }
            Some(Box::new(self()) as Box<dyn Any>)
        })
    }
}

impl<F, A, R> MemberFn<((A,), R)> for F
where
    F: Fn(&A) -> R + Send + Sync + 'static,
    A: 'static,
    R: 'static,
{
    fn parameters() -> Vec<TypeKey> {
        vec![TypeKey::of::<A>()]
    }

    fn returns() -> TypeKey {
        TypeKey::of::<R>()
    }

    fn into_invoker(self) -> Invoker {
        Box::new(move |args| match args {
            [a] => {
                let a = a.downcast_ref::<A>()?;
                Some(Box::new(self(a)) as Box<dyn Any>)
            }
            _ => None,
        })
    }
}

impl<F, A, B, R> MemberFn<((A, B), R)> for F
where
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
    A: 'static,
    B: 'static,
    R: 'static,
{
    fn parameters() -> Vec<TypeKey> {
        vec![TypeKey::of::<A>(), TypeKey::of::<B>()]
    }

    fn returns() -> TypeKey {
        TypeKey::of::<R>()
    }

    fn into_invoker(self) -> Invoker {
        Box::new(move |args| match args {
            [a, b] => {
                let a = a.downcast_ref::<A>()?;
                let b = b.downcast_ref::<B>()?;
                Some(Box::new(self(a, b)) as Box<dyn Any>)
            }
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Callable without an instance
    Static,
    /// Needs an instance of the declaring type
    Instance,
}

/// Parameter and return types of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSignature {
    pub parameters: Vec<TypeKey>,
    pub returns: TypeKey,
}

pub struct Member {
    name: String,
    kind: MemberKind,
    receiver: Receiver,
    signature: MemberSignature,
    condition_marker: bool,
    invoker: Invoker,
}

impl Member {
    /// Static method backed by `body`
    pub fn method<Args, F>(name: impl Into<String>, body: F) -> Self
    where
        F: MemberFn<Args>,
    {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            receiver: Receiver::Static,
            signature: MemberSignature {
                parameters: F::parameters(),
                returns: F::returns(),
            },
            condition_marker: false,
            invoker: body.into_invoker(),
        }
    }

    /// Static property backed by a getter
    pub fn property<F, R>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: 'static,
    {
        Self {
            kind: MemberKind::Property,
            ..Self::method::<((), R), F>(name, getter)
        }
    }

    /// Marks the member as requiring an instance of the declaring type
    pub fn instance(mut self) -> Self {
        self.receiver = Receiver::Instance;
        self
    }

    /// Attaches the condition marker to the member
    pub fn condition(mut self) -> Self {
        self.condition_marker = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn signature(&self) -> &MemberSignature {
        &self.signature
    }

    pub fn has_condition_marker(&self) -> bool {
        self.condition_marker
    }

    pub fn invoke(&self, args: &[&dyn Any]) -> Option<Box<dyn Any>> {
        (self.invoker)(args)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("receiver", &self.receiver)
            .field("signature", &self.signature)
            .field("condition_marker", &self.condition_marker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_captured_from_closure() {
        let nullary = Member::method("enabled", || true);
        assert!(nullary.signature().parameters.is_empty());
        assert!(nullary.signature().returns.is::<bool>());

        let unary = Member::method("threshold", |limit: &u32| *limit > 3);
        assert_eq!(unary.signature().parameters, vec![TypeKey::of::<u32>()]);

        let binary = Member::method("both", |a: &u8, b: &String| *a as usize == b.len());
        assert_eq!(binary.signature().parameters.len(), 2);
        assert!(binary.signature().returns.is::<bool>());
    }

    #[test]
    fn test_invoke_downcasts_arguments() {
        let member = Member::method("threshold", |limit: &u32| *limit > 3);

        let result = member.invoke(&[&5u32]).expect("argument matches");
        assert_eq!(result.downcast_ref::<bool>(), Some(&true));

        // 参数类型或数量不匹配时返回 None
        assert!(member.invoke(&[&"five"]).is_none());
        assert!(member.invoke(&[]).is_none());
    }

    #[test]
    fn test_property_and_flags() {
        let member = Member::property("IsLoaded", || false).condition().instance();
        assert_eq!(member.kind(), MemberKind::Property);
        assert_eq!(member.receiver(), Receiver::Instance);
        assert!(member.has_condition_marker());
        assert_eq!(member.name(), "IsLoaded");
    }
}
