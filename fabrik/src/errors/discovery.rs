use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryErrorKind {
    #[error("Namespace `{namespace}` isn't a valid module path")]
    InvalidNamespace { namespace: String },
    #[error("Index entry `{entry}` can't be resolved: module path `{module}` isn't valid")]
    Unresolvable { entry: &'static str, module: &'static str },
}
