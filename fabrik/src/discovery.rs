use alloc::{
    string::{String, ToString as _},
    vec::Vec,
};
use core::fmt::{self, Display, Formatter};
use tracing::{debug, error};

use crate::{any::TypeInfo, component::ComponentData, entry_getters, errors::DiscoveryErrorKind, import::ImportSite};

/// Module path the injector looks for components and imports under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    /// # Errors
    /// Returns [`DiscoveryErrorKind::InvalidNamespace`] if the path isn't a valid module path
    pub fn new(path: impl Into<String>) -> Result<Self, DiscoveryErrorKind> {
        let path = path.into();
        if is_module_path(&path) {
            Ok(Self(path))
        } else {
            Err(DiscoveryErrorKind::InvalidNamespace { namespace: path })
        }
    }

    /// Namespace of the module the type is declared in
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_info = TypeInfo::of::<T>();
        Self(type_info.module_path().unwrap_or(type_info.name).to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks that the module is the namespace itself or one of its descendants
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        match module.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_module_path(path: &str) -> bool {
    !path.is_empty()
        && path.split("::").all(|segment| {
            let segment = segment.strip_prefix("r#").unwrap_or(segment);
            let mut chars = segment.chars();
            matches!(chars.next(), Some(first) if first == '_' || first.is_alphabetic())
                && chars.all(|char| char == '_' || char.is_alphanumeric())
        })
}

/// Components and imports found under a namespace
#[derive(Clone, Default)]
pub struct Candidates {
    pub components: Vec<ComponentData>,
    pub imports: Vec<ImportSite>,
}

impl Candidates {
    /// Adds components and imports that aren't there yet
    pub fn merge(&mut self, components: impl IntoIterator<Item = ComponentData>, imports: impl IntoIterator<Item = ImportSite>) {
        for component in components {
            if !self.components.iter().any(|known| known.type_info == component.type_info) {
                self.components.push(component);
            }
        }
        for import in imports {
            if !self.imports.iter().any(|known| known.same_site(&import)) {
                self.imports.push(import);
            }
        }
    }
}

/// Source of components and imports for an injection pass
pub trait Discovery {
    /// # Errors
    /// Returns [`DiscoveryErrorKind::Unresolvable`] if an entry can't be resolved
    fn discover(&self, namespace: &Namespace) -> Result<Candidates, DiscoveryErrorKind>;
}

/// Index of components and imports registered by `#[component]` and `#[import]` at link time
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedIndex;

impl Discovery for LinkedIndex {
    fn discover(&self, namespace: &Namespace) -> Result<Candidates, DiscoveryErrorKind> {
        let components = entry_getters::__COMPONENT_GETTERS.iter().map(|getter| getter());
        let imports = entry_getters::__IMPORT_GETTERS.iter().map(|getter| getter());
        filter(namespace, components, imports)
    }
}

/// In-memory index filled by hand
#[derive(Clone, Default)]
pub struct StaticIndex {
    components: Vec<ComponentData>,
    imports: Vec<ImportSite>,
}

impl StaticIndex {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn component(mut self, component: ComponentData) -> Self {
        self.components.push(component);
        self
    }

    #[inline]
    #[must_use]
    pub fn import(mut self, import: ImportSite) -> Self {
        self.imports.push(import);
        self
    }
}

impl Discovery for StaticIndex {
    fn discover(&self, namespace: &Namespace) -> Result<Candidates, DiscoveryErrorKind> {
        filter(namespace, self.components.iter().cloned(), self.imports.iter().copied())
    }
}

fn filter(
    namespace: &Namespace,
    components: impl IntoIterator<Item = ComponentData>,
    imports: impl IntoIterator<Item = ImportSite>,
) -> Result<Candidates, DiscoveryErrorKind> {
    let mut found = Candidates::default();

    let mut matched_components = Vec::new();
    for component in components {
        if resolve(component.type_info.name, component.module, namespace)? {
            matched_components.push(component);
        }
    }
    let mut matched_imports = Vec::new();
    for import in imports {
        if resolve(import.name, import.owner, namespace)? {
            matched_imports.push(import);
        }
    }
    found.merge(matched_components, matched_imports);

    debug!(
        namespace = namespace.as_str(),
        components = found.components.len(),
        imports = found.imports.len(),
        "Discovered"
    );
    Ok(found)
}

fn resolve(entry: &'static str, module: &'static str, namespace: &Namespace) -> Result<bool, DiscoveryErrorKind> {
    if !is_module_path(module) {
        let err = DiscoveryErrorKind::Unresolvable { entry, module };
        error!("{}", err);
        return Err(err);
    }
    Ok(namespace.contains(module))
}

#[cfg(test)]
mod tests {
    use super::{Discovery as _, Namespace, StaticIndex};
    use crate::{
        component::ComponentData,
        errors::DiscoveryErrorKind,
        import::{Import, ImportSite},
    };

    struct Engine;
    struct Wheel;

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::new("garage").is_ok());
        assert!(Namespace::new("garage::cars::r#type").is_ok());
        assert!(Namespace::new("_private::v2").is_ok());

        for invalid in ["", "garage::", "::garage", "garage::::cars", "2garage", "gar-age", "garage cars"] {
            assert!(matches!(
                Namespace::new(invalid),
                Err(DiscoveryErrorKind::InvalidNamespace { .. })
            ));
        }
    }

    #[test]
    fn test_namespace_contains() {
        let namespace = Namespace::new("garage::cars").unwrap();

        assert!(namespace.contains("garage::cars"));
        assert!(namespace.contains("garage::cars::engine"));
        assert!(!namespace.contains("garage::carsharing"));
        assert!(!namespace.contains("garage"));
    }

    #[test]
    fn test_namespace_of_type() {
        assert_eq!(Namespace::of::<Engine>().as_str(), "fabrik::discovery::tests");
        assert_eq!(Namespace::of::<Option<Engine>>().as_str(), "core::option");
    }

    #[test]
    fn test_static_index_filters_namespace() {
        static ENGINE: Import<Engine> = Import::new();
        static WHEEL: Import<Wheel> = Import::new();

        let index = StaticIndex::new()
            .component(ComponentData::new::<Engine>("garage::cars"))
            .component(ComponentData::new::<Engine>("garage::cars::engine"))
            .component(ComponentData::new::<Wheel>("garage::trucks"))
            .import(ImportSite::of_static("garage::cars", "ENGINE", &ENGINE))
            .import(ImportSite::of_static("garage::cars", "ENGINE", &ENGINE))
            .import(ImportSite::of_static("garage::trucks", "WHEEL", &WHEEL));

        let cars = index.discover(&Namespace::new("garage::cars").unwrap()).unwrap();
        assert_eq!(cars.components.len(), 1);
        assert_eq!(cars.imports.len(), 1);

        let garage = index.discover(&Namespace::new("garage").unwrap()).unwrap();
        assert_eq!(garage.components.len(), 2);
        assert_eq!(garage.imports.len(), 2);

        let empty = index.discover(&Namespace::new("shop").unwrap()).unwrap();
        assert!(empty.components.is_empty());
        assert!(empty.imports.is_empty());
    }

    #[test]
    fn test_unresolvable_entry() {
        let index = StaticIndex::new().component(ComponentData::new::<Engine>("garage::"));

        assert!(matches!(
            index.discover(&Namespace::new("garage").unwrap()),
            Err(DiscoveryErrorKind::Unresolvable { module: "garage::", .. })
        ));
    }
}
