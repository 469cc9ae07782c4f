use alloc::vec::Vec;

use crate::{any::TypeInfo, instantiator::Instantiator};

/// Type that describes how it can be built.
///
/// Usually implemented by `#[component]`, but can be written by hand for types the macro can't see.
pub trait Component: 'static {
    #[must_use]
    fn component() -> ComponentData;
}

/// Factory marker with an optional priority.
/// Factories without a priority use [`crate::DEFAULT_PRIORITY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryMarker {
    pub priority: Option<i32>,
}

impl FactoryMarker {
    #[inline]
    #[must_use]
    pub const fn new(priority: Option<i32>) -> Self {
        Self { priority }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Associated function without `self` returning the component itself
    Constructor,
    Method,
}

/// Associated function of a component
#[derive(Clone)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
    pub receiver: bool,
    pub arity: usize,
    pub provides: TypeInfo,
    pub marker: Option<FactoryMarker>,
    pub(crate) instantiator: Option<Instantiator>,
}

impl Member {
    #[inline]
    #[must_use]
    pub fn constructor<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, MemberKind::Constructor)
    }

    #[inline]
    #[must_use]
    pub fn method<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, MemberKind::Method)
    }

    fn new<T: ?Sized + 'static>(name: &'static str, kind: MemberKind) -> Self {
        Self {
            name,
            kind,
            receiver: false,
            arity: 0,
            provides: TypeInfo::of::<T>(),
            marker: None,
            instantiator: None,
        }
    }

    /// Marks the member as taking `self`
    #[inline]
    #[must_use]
    pub fn with_receiver(mut self) -> Self {
        self.receiver = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    #[inline]
    #[must_use]
    pub fn factory(mut self, priority: Option<i32>) -> Self {
        self.marker = Some(FactoryMarker::new(priority));
        self
    }

    #[inline]
    #[must_use]
    pub fn instantiator(mut self, instantiator: Instantiator) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_factory(&self) -> bool {
        self.marker.is_some()
    }
}

/// Metadata of a component type: where it's declared and which of its members can build dependencies
#[derive(Clone)]
pub struct ComponentData {
    pub type_info: TypeInfo,
    pub module: &'static str,
    pub configuration: bool,
    pub factory: Option<FactoryMarker>,
    pub members: Vec<Member>,
}

impl ComponentData {
    #[inline]
    #[must_use]
    pub fn new<T: ?Sized + 'static>(module: &'static str) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            module,
            configuration: false,
            factory: None,
            members: Vec::new(),
        }
    }

    /// Marks the component as a configuration source: each of its factory methods provides its own dependency
    #[inline]
    #[must_use]
    pub fn configuration(mut self) -> Self {
        self.configuration = true;
        self
    }

    /// Adds a type-level factory marker: the component is built with its only constructor
    #[inline]
    #[must_use]
    pub fn factory(mut self, priority: Option<i32>) -> Self {
        self.factory = Some(FactoryMarker::new(priority));
        self
    }

    #[inline]
    #[must_use]
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub(crate) fn factory_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|member| member.is_factory())
    }

    pub(crate) fn constructors(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|member| member.kind == MemberKind::Constructor)
    }
}
