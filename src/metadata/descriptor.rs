use super::{Marker, Member, MemberFn, MemberKind, TypeKey};
use parking_lot::Once;
use std::fmt;
use std::marker::PhantomData;

/// One-time static initialization hook of a type.
///
/// The body runs at most once per descriptor, no matter how many scans touch it.
pub struct StaticInitializer {
    once: Once,
    body: Box<dyn Fn() + Send + Sync>,
}

impl StaticInitializer {
    pub fn new(body: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            once: Once::new(),
            body: Box::new(body),
        }
    }

    pub fn run(&self) {
        self.once.call_once(|| (self.body)());
    }

    pub fn has_run(&self) -> bool {
        self.once.state().done()
    }
}

impl fmt::Debug for StaticInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticInitializer")
            .field("has_run", &self.has_run())
            .finish()
    }
}

/// Everything the resolver knows about one type under scan: its markers, its
/// members, the contracts it implements and its static initializer.
#[derive(Debug)]
pub struct TypeDescriptor {
    key: TypeKey,
    markers: Vec<Marker>,
    members: Vec<Member>,
    contracts: Vec<TypeKey>,
    initializer: Option<StaticInitializer>,
}

impl TypeDescriptor {
    pub fn builder<T: 'static>() -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                key: TypeKey::of::<T>(),
                markers: Vec::new(),
                members: Vec::new(),
                contracts: Vec::new(),
                initializer: None,
            },
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    pub fn contracts(&self) -> &[TypeKey] {
        &self.contracts
    }

    /// Whether a value of this type can be handed out as `service`
    pub fn is_assignable_to(&self, service: TypeKey) -> bool {
        service == self.key || self.contracts.contains(&service)
    }

    /// Members with the given name and kind, with their positions
    pub fn members_named<'a, 'n>(
        &'a self,
        name: &'n str,
        kind: MemberKind,
    ) -> impl Iterator<Item = (usize, &'a Member)> + 'n
    where
        'a: 'n,
    {
        self.members
            .iter()
            .enumerate()
            .filter(move |(_, member)| member.kind() == kind && member.name() == name)
    }

    /// Members carrying the condition marker, in declaration order
    pub fn condition_members(&self) -> impl Iterator<Item = (usize, &Member)> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.has_condition_marker())
    }

    /// Runs the static initializer unless it already ran
    pub fn ensure_initialized(&self) {
        if let Some(initializer) = &self.initializer {
            initializer.run();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initializer
            .as_ref()
            .map_or(true, StaticInitializer::has_run)
    }
}

/// Typed builder for [`TypeDescriptor`].
///
/// ```rust,ignore
/// let descriptor = TypeDescriptor::builder::<SmtpMailer>()
///     .singleton_as::<dyn Mailer>(|mailer| mailer)
///     .condition("smtp_configured", |config: &Configuration| config.contains("smtp.host"))
///     .build();
/// ```
pub struct TypeDescriptorBuilder<T: 'static> {
    descriptor: TypeDescriptor,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> TypeDescriptorBuilder<T> {
    /// Attaches a raw declaration marker
    pub fn marker(mut self, marker: impl Into<Marker>) -> Self {
        self.descriptor.markers.push(marker.into());
        self
    }

    pub fn singleton(self) -> Self {
        self.marker(Marker::singleton::<T>())
    }

    pub fn scoped(self) -> Self {
        self.marker(Marker::scoped::<T>())
    }

    pub fn transient(self) -> Self {
        self.marker(Marker::transient::<T>())
    }

    pub fn singleton_as<I: ?Sized + 'static>(self, upcast: fn(&T) -> &I) -> Self {
        self.implements(upcast).marker(Marker::singleton_as::<T, I>())
    }

    pub fn scoped_as<I: ?Sized + 'static>(self, upcast: fn(&T) -> &I) -> Self {
        self.implements(upcast).marker(Marker::scoped_as::<T, I>())
    }

    pub fn transient_as<I: ?Sized + 'static>(self, upcast: fn(&T) -> &I) -> Self {
        self.implements(upcast).marker(Marker::transient_as::<T, I>())
    }

    /// Records that `T` fulfils the contract `I`.
    ///
    /// The upcast is never called; it has to type-check, which is the proof.
    pub fn implements<I: ?Sized + 'static>(mut self, _upcast: fn(&T) -> &I) -> Self {
        let contract = TypeKey::of::<I>();
        if !self.descriptor.contracts.contains(&contract) {
            self.descriptor.contracts.push(contract);
        }
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.descriptor.members.push(member);
        self
    }

    /// Adds a static method carrying the condition marker
    pub fn condition<Args, F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: MemberFn<Args>,
    {
        self.member(Member::method(name, body).condition())
    }

    pub fn initializer(mut self, body: impl Fn() + Send + Sync + 'static) -> Self {
        self.descriptor.initializer = Some(StaticInitializer::new(body));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}
