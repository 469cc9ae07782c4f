#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod dependency;
pub(crate) mod discovery;
pub(crate) mod errors;
pub(crate) mod import;
pub(crate) mod injector;
pub(crate) mod instantiator;
pub(crate) mod queue;

#[doc(hidden)]
pub mod entry_getters;

pub use any::TypeInfo;
pub use component::{Component, ComponentData, FactoryMarker, Member, MemberKind};
pub use config::{Config, DEFAULT_PRIORITY, PREPARED_PRIORITY};
pub use context::Context;
pub use dependency::Dependency;
pub use discovery::{Candidates, Discovery, LinkedIndex, Namespace, StaticIndex};
pub use errors::{DiscoveryErrorKind, InjectErrorKind, InstantiateErrorKind, InvalidFactoryReason, RequiredBy};
pub use import::{Import, ImportSite, ImportTarget, Slot};
pub use injector::{InjectionReport, Injector};
pub use instantiator::{instance, instance_rc, Instantiator};

#[cfg(feature = "macros")]
pub use fabrik_macros::{component, import};
