use alloc::{sync::Arc, vec::Vec};
use core::cmp::Ordering;
use tracing::{debug, error, warn};

use crate::{
    any::{RcAny, TypeInfo},
    component::{ComponentData, Member, MemberKind},
    config::DEFAULT_PRIORITY,
    errors::{InjectErrorKind, InvalidFactoryReason},
    instantiator::{instance_rc, Instantiator},
};

/// Something the injector can build: a dependency type, its instantiator and its priority.
/// Lower priority is built first.
#[derive(Clone)]
pub struct Dependency {
    type_info: TypeInfo,
    priority: i32,
    instantiator: Instantiator,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub fn new(type_info: TypeInfo, priority: i32, instantiator: Instantiator) -> Self {
        Self {
            type_info,
            priority,
            instantiator,
        }
    }

    /// Dependency that provides an already built value
    #[inline]
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(value: T, priority: i32) -> Self {
        Self::instance_rc(Arc::new(value), priority)
    }

    #[inline]
    #[must_use]
    pub fn instance_rc<T: Send + Sync + 'static>(value: Arc<T>, priority: i32) -> Self {
        Self::new(TypeInfo::of::<T>(), priority, instance_rc(value))
    }

    /// Collects dependencies the component declares.
    /// Configuration components may declare any number of them, other components at most one.
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::TooManyFactories`] if a non-configuration component has more than one factory
    /// - Returns [`InjectErrorKind::InvalidFactoryDefinition`] if a factory has an invalid shape
    pub fn collect(component: &ComponentData) -> Result<Vec<Self>, InjectErrorKind> {
        if component.configuration {
            Self::from_configuration(component)
        } else {
            Ok(Self::from_component(component)?.into_iter().collect())
        }
    }

    /// Builds dependency of a non-configuration component.
    /// Returns `None` if the component doesn't declare any factory.
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::TooManyFactories`] if the component has more than one factory
    /// - Returns [`InjectErrorKind::InvalidFactoryDefinition`] if the factory has an invalid shape
    pub fn from_component(component: &ComponentData) -> Result<Option<Self>, InjectErrorKind> {
        if let Some(marker) = component.factory {
            return Self::from_default_constructor(component, marker.priority).map(Some);
        }

        let mut factories = component.factory_members();
        let Some(member) = factories.next() else {
            debug!(component = component.type_info.name, "No factory");
            return Ok(None);
        };

        let count = 1 + factories.count();
        if count > 1 {
            let err = InjectErrorKind::TooManyFactories {
                component: component.type_info,
                count,
            };
            error!("{}", err);
            return Err(err);
        }

        match member.kind {
            MemberKind::Constructor => check_arity(component, member)?,
            MemberKind::Method => {
                check_static(component, member)?;
                check_arity(component, member)?;
                if member.provides != component.type_info {
                    return Err(invalid(
                        component,
                        member.name,
                        InvalidFactoryReason::WrongReturnType {
                            expected: component.type_info,
                            actual: member.provides,
                        },
                    ));
                }
            }
        }

        Self::from_member(component, member).map(Some)
    }

    /// Builds a dependency per factory method of a configuration component.
    /// Constructors aren't factories here.
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::InvalidFactoryDefinition`] if a factory method takes `self` or arguments
    pub fn from_configuration(component: &ComponentData) -> Result<Vec<Self>, InjectErrorKind> {
        let mut dependencies = Vec::new();
        for member in component.factory_members() {
            if member.kind == MemberKind::Constructor {
                warn!(
                    component = component.type_info.name,
                    member = member.name,
                    "Constructor of configuration component isn't a factory, ignored"
                );
                continue;
            }

            check_static(component, member)?;
            check_arity(component, member)?;
            dependencies.push(Self::from_member(component, member)?);
        }
        Ok(dependencies)
    }

    fn from_default_constructor(component: &ComponentData, priority: Option<i32>) -> Result<Self, InjectErrorKind> {
        let mut constructors = component.constructors();
        match (constructors.next(), constructors.count()) {
            (Some(constructor), 0) if constructor.arity == 0 => Ok(Self {
                type_info: component.type_info,
                priority: priority.unwrap_or(DEFAULT_PRIORITY),
                instantiator: callable(component, constructor)?,
            }),
            (first, rest) => {
                let member = first.map_or("<none>", |constructor| constructor.name);
                let constructors = usize::from(first.is_some()) + rest;
                Err(invalid(
                    component,
                    member,
                    InvalidFactoryReason::NoDefaultConstructor { constructors },
                ))
            }
        }
    }

    fn from_member(component: &ComponentData, member: &Member) -> Result<Self, InjectErrorKind> {
        Ok(Self {
            type_info: member.provides,
            priority: member.marker.and_then(|marker| marker.priority).unwrap_or(DEFAULT_PRIORITY),
            instantiator: callable(component, member)?,
        })
    }
}

impl Dependency {
    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Compares priorities only, dependencies with equal priorities are equal here.
    /// Queues that need a stable order have to break ties themselves.
    #[inline]
    #[must_use]
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }

    /// Calls the instantiator.
    ///
    /// # Errors
    /// Returns [`InjectErrorKind::DependencyInitialization`] with the factory error as its source
    pub fn build(&self) -> Result<RcAny, InjectErrorKind> {
        match self.instantiator.call() {
            Ok(dependency) => {
                debug!(dependency = self.type_info.name, "Built");
                Ok(dependency)
            }
            Err(err) => {
                error!(dependency = self.type_info.name, "{:?}", err);
                Err(InjectErrorKind::DependencyInitialization {
                    dependency: self.type_info,
                    source: err,
                })
            }
        }
    }
}

fn check_static(component: &ComponentData, member: &Member) -> Result<(), InjectErrorKind> {
    if member.receiver {
        return Err(invalid(component, member.name, InvalidFactoryReason::NotStatic));
    }
    Ok(())
}

fn check_arity(component: &ComponentData, member: &Member) -> Result<(), InjectErrorKind> {
    if member.arity != 0 {
        return Err(invalid(
            component,
            member.name,
            InvalidFactoryReason::TakesArguments { arity: member.arity },
        ));
    }
    Ok(())
}

fn callable(component: &ComponentData, member: &Member) -> Result<Instantiator, InjectErrorKind> {
    member
        .instantiator
        .clone()
        .ok_or_else(|| invalid(component, member.name, InvalidFactoryReason::NotCallable))
}

fn invalid(component: &ComponentData, member: &'static str, reason: InvalidFactoryReason) -> InjectErrorKind {
    let err = InjectErrorKind::InvalidFactoryDefinition {
        component: component.type_info,
        member,
        reason,
    };
    error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Dependency;
    use crate::{
        any::TypeInfo,
        component::{ComponentData, Member},
        config::DEFAULT_PRIORITY,
        errors::{InjectErrorKind, InstantiateErrorKind, InvalidFactoryReason},
        instantiator::Instantiator,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::cmp::Ordering;
    use tracing_test::traced_test;

    struct Engine;
    struct Wheel;
    struct Garage;

    fn engine() -> Instantiator {
        Instantiator::new(|| Ok::<_, InstantiateErrorKind>(Engine))
    }

    #[test]
    #[traced_test]
    fn test_component_without_factory() {
        let component = ComponentData::new::<Engine>(module_path!()).member(Member::constructor::<Engine>("new").instantiator(engine()));

        assert!(Dependency::from_component(&component).unwrap().is_none());
        assert!(Dependency::collect(&component).unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_factory_constructor() {
        let component = ComponentData::new::<Engine>(module_path!())
            .member(Member::constructor::<Engine>("new").factory(Some(2)).instantiator(engine()));

        let dependency = Dependency::from_component(&component).unwrap().unwrap();
        assert_eq!(dependency.type_info(), TypeInfo::of::<Engine>());
        assert_eq!(dependency.priority(), 2);
        assert!(dependency.build().unwrap().downcast::<Engine>().is_ok());
    }

    #[test]
    #[traced_test]
    fn test_factory_method_default_priority() {
        let component =
            ComponentData::new::<Engine>(module_path!()).member(Member::method::<Engine>("build").factory(None).instantiator(engine()));

        let dependency = Dependency::from_component(&component).unwrap().unwrap();
        assert_eq!(dependency.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    #[traced_test]
    fn test_too_many_factories() {
        let component = ComponentData::new::<Engine>(module_path!())
            .member(Member::constructor::<Engine>("new").factory(None).instantiator(engine()))
            .member(Member::method::<Engine>("build").factory(Some(1)).instantiator(engine()));

        assert!(matches!(
            Dependency::from_component(&component),
            Err(InjectErrorKind::TooManyFactories { count: 2, .. })
        ));
        assert!(logs_contain("has 2 factories"));
    }

    #[test]
    #[traced_test]
    fn test_invalid_factory_method() {
        let non_static = ComponentData::new::<Engine>(module_path!())
            .member(Member::method::<Engine>("build").with_receiver().factory(None));
        let with_args = ComponentData::new::<Engine>(module_path!())
            .member(Member::method::<Engine>("build").with_arity(2).factory(None));
        let wrong_type = ComponentData::new::<Engine>(module_path!())
            .member(Member::method::<Wheel>("wheel").factory(None).instantiator(Instantiator::new(|| Ok(Wheel))));
        let constructor_with_args = ComponentData::new::<Engine>(module_path!())
            .member(Member::constructor::<Engine>("with_power").with_arity(1).factory(None));
        let not_callable = ComponentData::new::<Engine>(module_path!()).member(Member::constructor::<Engine>("new").factory(None));

        for (component, expected) in [
            (non_static, InvalidFactoryReason::NotStatic),
            (with_args, InvalidFactoryReason::TakesArguments { arity: 2 }),
            (
                wrong_type,
                InvalidFactoryReason::WrongReturnType {
                    expected: TypeInfo::of::<Engine>(),
                    actual: TypeInfo::of::<Wheel>(),
                },
            ),
            (constructor_with_args, InvalidFactoryReason::TakesArguments { arity: 1 }),
            (not_callable, InvalidFactoryReason::NotCallable),
        ] {
            match Dependency::from_component(&component) {
                Err(InjectErrorKind::InvalidFactoryDefinition { reason, .. }) => assert_eq!(reason, expected),
                _ => panic!("expected invalid factory definition"),
            }
        }
    }

    #[test]
    #[traced_test]
    fn test_type_level_factory() {
        let component = ComponentData::new::<Engine>(module_path!())
            .factory(Some(3))
            .member(Member::constructor::<Engine>("new").instantiator(engine()));

        let dependency = Dependency::from_component(&component).unwrap().unwrap();
        assert_eq!(dependency.priority(), 3);
        assert_eq!(dependency.type_info(), TypeInfo::of::<Engine>());
    }

    #[test]
    #[traced_test]
    fn test_type_level_factory_without_default_constructor() {
        let no_constructors = ComponentData::new::<Engine>(module_path!()).factory(None);
        let with_args = ComponentData::new::<Engine>(module_path!())
            .factory(None)
            .member(Member::constructor::<Engine>("with_power").with_arity(1));
        let two_constructors = ComponentData::new::<Engine>(module_path!())
            .factory(None)
            .member(Member::constructor::<Engine>("new").instantiator(engine()))
            .member(Member::constructor::<Engine>("small").instantiator(engine()));

        for (component, constructors) in [(no_constructors, 0), (with_args, 1), (two_constructors, 2)] {
            match Dependency::from_component(&component) {
                Err(InjectErrorKind::InvalidFactoryDefinition {
                    reason: InvalidFactoryReason::NoDefaultConstructor { constructors: actual },
                    ..
                }) => assert_eq!(actual, constructors),
                _ => panic!("expected missing default constructor"),
            }
        }
    }

    #[test]
    #[traced_test]
    fn test_configuration() {
        let component = ComponentData::new::<Garage>(module_path!())
            .configuration()
            .member(Member::method::<Engine>("engine").factory(Some(5)).instantiator(engine()))
            .member(Member::method::<Wheel>("wheel").factory(None).instantiator(Instantiator::new(|| Ok(Wheel))))
            .member(Member::constructor::<Garage>("new").factory(None).instantiator(Instantiator::new(|| Ok(Garage))))
            .member(Member::method::<Wheel>("spare").instantiator(Instantiator::new(|| Ok(Wheel))));

        let dependencies = Dependency::collect(&component).unwrap();
        assert_eq!(dependencies.len(), 2);
        assert_eq!(dependencies[0].type_info(), TypeInfo::of::<Engine>());
        assert_eq!(dependencies[0].priority(), 5);
        assert_eq!(dependencies[1].type_info(), TypeInfo::of::<Wheel>());
        assert_eq!(dependencies[1].priority(), DEFAULT_PRIORITY);
        assert!(logs_contain("isn't a factory, ignored"));
    }

    #[test]
    #[traced_test]
    fn test_configuration_invalid_method() {
        let component = ComponentData::new::<Garage>(module_path!())
            .configuration()
            .member(Member::method::<Engine>("engine").with_receiver().factory(None));

        assert!(matches!(
            Dependency::collect(&component),
            Err(InjectErrorKind::InvalidFactoryDefinition {
                reason: InvalidFactoryReason::NotStatic,
                ..
            })
        ));
    }

    #[test]
    #[traced_test]
    fn test_build_error_keeps_source() {
        let dependency = Dependency::new(
            TypeInfo::of::<Engine>(),
            0,
            Instantiator::new(|| Err::<Engine, _>(InstantiateErrorKind::msg("no fuel"))),
        );

        let err = dependency.build().err().unwrap();
        assert!(matches!(err, InjectErrorKind::DependencyInitialization { .. }));
        assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "no fuel");
        assert!(logs_contain("no fuel"));
    }

    #[test]
    fn test_instance_and_priority_order() {
        let engine = Arc::new(Engine);
        let first = Dependency::instance_rc(engine.clone(), 0);
        let second = Dependency::instance(Wheel, 0);
        let third = Dependency::instance(Garage, 1);

        assert!(Arc::ptr_eq(&first.build().unwrap().downcast::<Engine>().unwrap(), &engine));
        assert_eq!(first.cmp_priority(&second), Ordering::Equal);
        assert_eq!(second.cmp_priority(&third), Ordering::Less);
    }
}
