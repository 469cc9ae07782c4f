use alloc::{collections::BTreeMap, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

pub(crate) type RcAny = Arc<dyn Any + Send + Sync>;

pub(crate) type Map = BTreeMap<TypeInfo, RcAny>;

/// Stable key of a dependency: the [`TypeId`] used for lookups and the type name used in messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn of_val<T>(_val: &T) -> Self
    where
        T: ?Sized + 'static,
    {
        Self::of::<T>()
    }

    /// Type name without its module path, generics included
    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let path = self.name.split_once('<').map_or(self.name, |(path, _)| path);
        match path.rsplit_once("::") {
            Some((module, _)) => &self.name[module.len() + 2..],
            None => self.name,
        }
    }

    /// Module path the type is declared in, `None` for types without one (primitives, references)
    #[must_use]
    pub fn module_path(&self) -> Option<&'static str> {
        let path = self.name.split_once('<').map_or(self.name, |(path, _)| path);
        path.rsplit_once("::").map(|(module, _)| module)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    use alloc::string::ToString as _;

    struct Engine;
    struct Wrapper<T>(T);

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<Engine>().short_name(), "Engine");
        assert_eq!(TypeInfo::of::<Wrapper<Engine>>().short_name(), "Wrapper<fabrik::any::tests::Engine>");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
    }

    #[test]
    fn test_module_path() {
        assert_eq!(TypeInfo::of::<Engine>().module_path(), Some("fabrik::any::tests"));
        assert_eq!(TypeInfo::of::<Wrapper<u8>>().module_path(), Some("fabrik::any::tests"));
        assert_eq!(TypeInfo::of::<u8>().module_path(), None);
    }

    #[test]
    fn test_eq_by_id() {
        let engine = Engine;
        assert_eq!(TypeInfo::of::<Engine>(), TypeInfo::of_val(&engine));
        assert_ne!(TypeInfo::of::<Engine>(), TypeInfo::of::<Wrapper<Engine>>());
        assert_eq!(TypeInfo::of::<Engine>().to_string(), "fabrik::any::tests::Engine");
    }
}
