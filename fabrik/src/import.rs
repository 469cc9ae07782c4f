use alloc::sync::Arc;
use core::{
    fmt::{self, Debug, Formatter},
    ptr,
};
use parking_lot::RwLock;

use crate::any::{RcAny, TypeInfo};

/// Static slot that receives a dependency during injection.
///
/// ```
/// use fabrik::Import;
///
/// struct Engine;
///
/// static ENGINE: Import<Engine> = Import::new();
///
/// assert!(ENGINE.get().is_none());
/// ```
pub struct Import<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> Import<T> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: parking_lot::const_rwlock(None),
        }
    }

    /// Returns the last injected value
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.read().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_injected(&self) -> bool {
        self.value.read().is_some()
    }

    #[inline]
    pub fn set(&self, value: Arc<T>) -> Option<Arc<T>> {
        self.value.write().replace(value)
    }

    #[inline]
    pub fn take(&self) -> Option<Arc<T>> {
        self.value.write().take()
    }
}

impl<T> Default for Import<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Debug for Import<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Import")
            .field("dependency", &TypeInfo::of::<T>().name)
            .field("injected", &self.is_injected())
            .finish()
    }
}

/// Type-erased [`Import`] the injector writes into
pub trait Slot: Send + Sync {
    /// Stores the value, giving it back if it has another type
    fn assign(&self, value: RcAny) -> Result<(), RcAny>;
}

impl<T: Send + Sync + 'static> Slot for Import<T> {
    fn assign(&self, value: RcAny) -> Result<(), RcAny> {
        self.set(value.downcast::<T>()?);
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum ImportTarget {
    Static(&'static dyn Slot),
    /// Not a place the injector can write to, e.g. a `const` item
    NonStatic,
}

/// Item marked for import: it asks for a dependency of type `dependency`
#[derive(Clone, Copy)]
pub struct ImportSite {
    pub owner: &'static str,
    pub name: &'static str,
    pub dependency: TypeInfo,
    pub target: ImportTarget,
}

impl ImportSite {
    #[inline]
    #[must_use]
    pub fn of_static<T: Send + Sync + 'static>(owner: &'static str, name: &'static str, slot: &'static Import<T>) -> Self {
        Self {
            owner,
            name,
            dependency: TypeInfo::of::<T>(),
            target: ImportTarget::Static(slot),
        }
    }

    #[inline]
    #[must_use]
    pub fn of_const<T: 'static>(owner: &'static str, name: &'static str, _slot: &Import<T>) -> Self {
        Self {
            owner,
            name,
            dependency: TypeInfo::of::<T>(),
            target: ImportTarget::NonStatic,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.target, ImportTarget::Static(_))
    }

    #[inline]
    #[must_use]
    pub(crate) fn same_site(&self, other: &Self) -> bool {
        match (self.target, other.target) {
            (ImportTarget::Static(slot), ImportTarget::Static(other_slot)) => ptr::addr_eq(slot, other_slot),
            (ImportTarget::NonStatic, ImportTarget::NonStatic) => self.owner == other.owner && self.name == other.name,
            _ => false,
        }
    }
}

impl Debug for ImportSite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSite")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("dependency", &self.dependency.name)
            .field("static", &self.is_static())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Import, ImportSite, Slot as _};
    use crate::any::RcAny;

    use alloc::sync::Arc;

    struct Engine;
    struct Wheel;

    #[test]
    fn test_assign_replaces_value() {
        static ENGINE: Import<Engine> = Import::new();

        let first = Arc::new(Engine);
        let second = Arc::new(Engine);

        ENGINE.assign(first.clone() as RcAny).ok().unwrap();
        assert!(Arc::ptr_eq(&ENGINE.get().unwrap(), &first));

        ENGINE.assign(second.clone() as RcAny).ok().unwrap();
        assert!(Arc::ptr_eq(&ENGINE.get().unwrap(), &second));
    }

    #[test]
    fn test_assign_incorrect_type() {
        static ENGINE: Import<Engine> = Import::new();

        assert!(ENGINE.assign(Arc::new(Wheel) as RcAny).is_err());
        assert!(!ENGINE.is_injected());
    }

    #[test]
    fn test_site_kinds() {
        static ENGINE: Import<Engine> = Import::new();
        const WHEEL: Import<Wheel> = Import::new();

        let static_site = ImportSite::of_static("garage", "ENGINE", &ENGINE);
        #[allow(clippy::borrow_interior_mutable_const)]
        let const_site = ImportSite::of_const("garage", "WHEEL", &WHEEL);

        assert!(static_site.is_static());
        assert!(!const_site.is_static());
        assert!(!static_site.same_site(&const_site));
        assert_eq!(const_site.dependency.short_name(), "Wheel");
    }

    #[test]
    fn test_same_site_by_slot() {
        static FRONT: Import<Wheel> = Import::new();
        static REAR: Import<Wheel> = Import::new();

        let front = ImportSite::of_static("garage::car", "WHEEL", &FRONT);
        let rear = ImportSite::of_static("garage::car", "WHEEL", &REAR);

        assert!(front.same_site(&ImportSite::of_static("garage::truck", "FRONT", &FRONT)));
        assert!(!front.same_site(&rear));
    }
}
