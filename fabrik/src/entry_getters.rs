//! Link-time index filled by `#[component]` and `#[import]`.
//! Used by the generated code, not meant to be used directly.

use crate::{component::ComponentData, import::ImportSite};

pub use linkme::{self, distributed_slice};

#[distributed_slice]
pub static __COMPONENT_GETTERS: [fn() -> ComponentData];

#[distributed_slice]
pub static __IMPORT_GETTERS: [fn() -> ImportSite];
