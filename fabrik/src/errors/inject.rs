use core::{
    any::TypeId,
    fmt::{self, Display, Formatter},
};

use super::{discovery::DiscoveryErrorKind, instantiate::InstantiateErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InjectErrorKind {
    #[error("Component `{component}` has {count} factories, only one constructor or associated function can be marked")]
    TooManyFactories { component: TypeInfo, count: usize },
    #[error(
        "Dependency `{dependency}` {required_by} has no factory. \
        Mark a constructor or associated function with `#[factory]` or register an instance"
    )]
    NoFactoryAvailable { dependency: TypeInfo, required_by: RequiredBy },
    #[error("Invalid factory `{member}` in component `{component}`: {reason}")]
    InvalidFactoryDefinition {
        component: TypeInfo,
        member: &'static str,
        reason: InvalidFactoryReason,
    },
    #[error("Import `{field}` in `{owner}` must be a static item")]
    InvalidImportTarget { owner: &'static str, field: &'static str },
    #[error("Dependency `{dependency}` initialization failed")]
    DependencyInitialization {
        dependency: TypeInfo,
        #[source]
        source: InstantiateErrorKind,
    },
    #[error("Incorrect dependency type. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
    #[error(transparent)]
    Discovery(#[from] DiscoveryErrorKind),
}

/// Who was waiting for a dependency that has no factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredBy {
    Import { owner: &'static str, field: &'static str },
    Lookup,
}

impl Display for RequiredBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import { owner, field } => write!(f, "required by import `{owner}::{field}`"),
            Self::Lookup => f.write_str("requested from context"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFactoryReason {
    /// Factory method takes `self`
    NotStatic,
    TakesArguments { arity: usize },
    WrongReturnType { expected: TypeInfo, actual: TypeInfo },
    /// Component with a type-level marker doesn't have exactly one constructor without arguments
    NoDefaultConstructor { constructors: usize },
    /// Factory has a valid shape but nothing to call it with
    NotCallable,
}

impl Display for InvalidFactoryReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStatic => f.write_str("factory method must not take `self`"),
            Self::TakesArguments { arity } => write!(f, "factory must be without arguments, found {arity}"),
            Self::WrongReturnType { expected, actual } => {
                write!(f, "factory method must return `{expected}`, found `{actual}`")
            }
            Self::NoDefaultConstructor { constructors } => write!(
                f,
                "component with a type-level factory must only have a constructor without arguments, found {constructors} constructors"
            ),
            Self::NotCallable => f.write_str("factory has no instantiator"),
        }
    }
}
