mod discovery;
mod inject;
mod instantiate;

pub use discovery::DiscoveryErrorKind;
pub use inject::{InjectErrorKind, InvalidFactoryReason, RequiredBy};
pub use instantiate::InstantiateErrorKind;
