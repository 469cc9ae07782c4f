use alloc::{collections::BTreeMap, sync::Arc};
use core::any::type_name;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{self, RcAny, TypeInfo},
    dependency::Dependency,
    errors::{InjectErrorKind, RequiredBy},
};

/// Lazily builds dependencies on request and caches them.
///
/// Unlike an injection pass, asking for a dependency without a factory is an error here.
pub struct Context {
    dependencies: BTreeMap<TypeInfo, Dependency>,
    cache: Mutex<any::Map>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            dependencies: BTreeMap::new(),
            cache: Mutex::new(any::Map::new()),
        }
    }

    /// Creates context from dependencies.
    /// If several dependencies provide the same type, the one with the lowest priority is used,
    /// and the first one of them if priorities are equal.
    #[must_use]
    pub fn from_dependencies(dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        let mut by_type = BTreeMap::new();
        for dependency in dependencies {
            match by_type.entry(dependency.type_info()) {
                Vacant(entry) => {
                    entry.insert(dependency);
                }
                Occupied(mut entry) => {
                    if dependency.cmp_priority(entry.get()).is_lt() {
                        entry.insert(dependency);
                    }
                }
            }
        }

        Self {
            dependencies: by_type,
            cache: Mutex::new(any::Map::new()),
        }
    }

    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) -> Option<Arc<T>> {
        self.insert_rc(Arc::new(value))
    }

    #[inline]
    pub fn insert_rc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Option<Arc<T>> {
        self.cache
            .lock()
            .insert(TypeInfo::of::<T>(), value)
            .and_then(|cached| cached.downcast().ok())
    }

    #[inline]
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        let type_info = TypeInfo::of::<T>();
        self.cache.lock().contains_key(&type_info) || self.dependencies.contains_key(&type_info)
    }

    /// Gets a dependency, building it on the first request
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::NoFactoryAvailable`] if nothing provides the type
    /// - Returns [`InjectErrorKind::DependencyInitialization`] if the factory fails
    /// - Returns [`InjectErrorKind::IncorrectType`] if the factory provides another type
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectErrorKind> {
        let span = info_span!("get", dependency = type_name::<T>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<T>();

        if let Some(cached) = self.cache.lock().get(&type_info) {
            debug!("Found in cache");
            return downcast(type_info, cached.clone());
        }
        debug!("Not found in cache");

        let Some(dependency) = self.dependencies.get(&type_info) else {
            let err = InjectErrorKind::NoFactoryAvailable {
                dependency: type_info,
                required_by: RequiredBy::Lookup,
            };
            error!("{}", err);
            return Err(err);
        };

        let built = downcast::<T>(type_info, dependency.build()?)?;
        let cached = self.cache.lock().entry(type_info).or_insert_with(|| built.clone() as RcAny).clone();
        debug!("Cached");

        downcast(type_info, cached)
    }
}

fn downcast<T: Send + Sync + 'static>(expected: TypeInfo, value: RcAny) -> Result<Arc<T>, InjectErrorKind> {
    value.downcast::<T>().map_err(|value| {
        let err = InjectErrorKind::IncorrectType {
            expected,
            actual: (*value).type_id(),
        };
        error!("{}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Context;
    use crate::{
        any::TypeInfo,
        dependency::Dependency,
        errors::{InjectErrorKind, InstantiateErrorKind, RequiredBy},
        instantiator::Instantiator,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    struct Engine(u8);
    struct Wheel;

    #[test]
    #[traced_test]
    fn test_get_builds_once() {
        let call_count = Arc::new(AtomicU8::new(0));
        let context = Context::from_dependencies([Dependency::new(
            TypeInfo::of::<Engine>(),
            2,
            Instantiator::new({
                let call_count = call_count.clone();
                move || Ok::<_, InstantiateErrorKind>(Engine(call_count.fetch_add(1, Ordering::SeqCst)))
            }),
        )]);

        let first = context.get::<Engine>().unwrap();
        let second = context.get::<Engine>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.0, 0);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Found in cache"));
    }

    #[test]
    #[traced_test]
    fn test_get_without_factory() {
        let context = Context::new();

        assert!(!context.contains::<Wheel>());
        assert!(matches!(
            context.get::<Wheel>(),
            Err(InjectErrorKind::NoFactoryAvailable {
                required_by: RequiredBy::Lookup,
                ..
            })
        ));
    }

    #[test]
    #[traced_test]
    fn test_lowest_priority_wins() {
        let context = Context::from_dependencies([
            Dependency::instance(Engine(1), 5),
            Dependency::instance(Engine(2), 1),
            Dependency::instance(Engine(3), 1),
        ]);

        assert_eq!(context.get::<Engine>().unwrap().0, 2);
    }

    #[test]
    #[traced_test]
    fn test_insert_overrides_factory() {
        let context = Context::from_dependencies([Dependency::instance(Engine(1), 0)]);
        let engine = Arc::new(Engine(9));

        assert!(context.insert_rc(engine.clone()).is_none());
        assert!(Arc::ptr_eq(&context.get::<Engine>().unwrap(), &engine));
        assert!(context.insert(Engine(10)).is_some());
        assert_eq!(context.get::<Engine>().unwrap().0, 10);
    }

    #[test]
    #[traced_test]
    fn test_incorrect_type() {
        let context = Context::from_dependencies([Dependency::new(
            TypeInfo::of::<Engine>(),
            0,
            Instantiator::new(|| Ok::<_, InstantiateErrorKind>(Wheel)),
        )]);

        assert!(matches!(context.get::<Engine>(), Err(InjectErrorKind::IncorrectType { .. })));
    }
}
