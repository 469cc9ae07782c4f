use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use tracing::{debug, error, info_span, warn};

use crate::{
    any::TypeInfo,
    component::{Component, ComponentData},
    config::{Config, PREPARED_PRIORITY},
    context::Context,
    dependency::Dependency,
    discovery::{Candidates, Discovery, LinkedIndex, Namespace},
    errors::{InjectErrorKind, RequiredBy},
    import::{ImportSite, ImportTarget},
    queue::DependencyQueue,
};

/// What an injection pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Built dependencies in build order
    pub built: Vec<TypeInfo>,
    /// Count of assigned imports
    pub assigned: usize,
    /// Count of dependencies nothing imported and that weren't built
    pub skipped: usize,
}

/// Runs injection passes: finds components and imports under a namespace,
/// builds dependencies in priority order and writes them into the imports.
///
/// Registered components, imports and instances are kept between passes.
///
/// # Warning
/// - A pass isn't a transaction: if it fails, imports assigned before the failure keep their new values.
/// - Passing the same namespace again builds dependencies again and overwrites the imports.
/// - There is no timeout for factories, a factory that hangs blocks the pass.
pub struct Injector<D = LinkedIndex> {
    discovery: D,
    config: Config,
    components: Vec<ComponentData>,
    imports: Vec<ImportSite>,
    instances: Vec<Dependency>,
}

impl Default for Injector<LinkedIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector<LinkedIndex> {
    /// Creates injector that discovers components and imports marked with `#[component]` and `#[import]`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_discovery(LinkedIndex)
    }
}

impl<D> Injector<D> {
    #[inline]
    #[must_use]
    pub fn with_discovery(discovery: D) -> Self {
        Self {
            discovery,
            config: Config::default(),
            components: Vec::new(),
            imports: Vec::new(),
            instances: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    #[inline]
    pub fn set_diagnostics_enabled(&mut self, enabled: bool) -> &mut Self {
        self.config.diagnostics = enabled;
        self
    }

    /// Registers an already built dependency
    #[inline]
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, value: T, priority: i32) -> &mut Self {
        self.register_instance_rc(Arc::new(value), priority)
    }

    /// Registers an already built dependency, imports receive this exact value
    #[inline]
    pub fn register_instance_rc<T: Send + Sync + 'static>(&mut self, value: Arc<T>, priority: i32) -> &mut Self {
        self.instances.push(Dependency::instance_rc(value, priority));
        self
    }

    /// Registers an already built dependency with [`PREPARED_PRIORITY`]
    #[inline]
    pub fn register_prepared<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.register_instance(value, PREPARED_PRIORITY)
    }

    /// Adds components to the ones found by discovery
    #[inline]
    pub fn register_types(&mut self, components: impl IntoIterator<Item = ComponentData>) -> &mut Self {
        self.components.extend(components);
        self
    }

    #[inline]
    pub fn register_type<T: Component>(&mut self) -> &mut Self {
        self.register_types([T::component()])
    }

    /// Adds imports to the ones found by discovery
    #[inline]
    pub fn register_imports(&mut self, imports: impl IntoIterator<Item = ImportSite>) -> &mut Self {
        self.imports.extend(imports);
        self
    }

    /// Drops registered components, imports and instances
    pub fn clear(&mut self) {
        self.components.clear();
        self.imports.clear();
        self.instances.clear();
    }
}

impl<D: Discovery> Injector<D> {
    /// Runs an injection pass for the namespace
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::Discovery`] if the namespace or one of the index entries is invalid
    /// - Returns [`InjectErrorKind::TooManyFactories`] and [`InjectErrorKind::InvalidFactoryDefinition`]
    ///   if a component is misconfigured. Nothing is built or assigned in this case
    /// - Returns [`InjectErrorKind::InvalidImportTarget`] if a dependency has to be written into a non-static import
    /// - Returns [`InjectErrorKind::DependencyInitialization`] if a factory fails
    /// - Returns [`InjectErrorKind::NoFactoryAvailable`] if an import is left without a dependency
    pub fn inject(&self, namespace: &str) -> Result<InjectionReport, InjectErrorKind> {
        let namespace = Namespace::new(namespace).map_err(|err| {
            error!("{}", err);
            InjectErrorKind::from(err)
        })?;
        self.inject_namespace(&namespace)
    }

    /// Runs an injection pass for the namespace of the type
    ///
    /// # Warning
    /// The namespace of a type declared inside a function includes the function name,
    /// while `#[component]` and `#[import]` record the module only.
    /// Such a namespace finds nothing: the pass does nothing and a warning is logged.
    ///
    /// # Errors
    /// Same as [`Self::inject`]
    #[inline]
    pub fn inject_for<T: ?Sized + 'static>(&self) -> Result<InjectionReport, InjectErrorKind> {
        self.inject_namespace(&Namespace::of::<T>())
    }

    /// # Errors
    /// Same as [`Self::inject`]
    pub fn inject_namespace(&self, namespace: &Namespace) -> Result<InjectionReport, InjectErrorKind> {
        let span = info_span!("inject", namespace = namespace.as_str());
        let _guard = span.enter();

        progress!(self.config, "Starting injection in {namespace}");

        let candidates = self.candidates(namespace)?;
        if candidates.components.is_empty() && candidates.imports.is_empty() {
            warn!(namespace = namespace.as_str(), "No components or imports found");
        }

        let mut queue = DependencyQueue::new();
        queue.extend(self.instances.iter().cloned());
        for component in &candidates.components {
            progress!(self.config, "Parsing {}", component.type_info);
            for dependency in Dependency::collect(component)? {
                progress!(self.config, "Dependency {} loaded", dependency.type_info());
                queue.push(dependency);
            }
        }
        debug!(dependencies = queue.len(), "Queued");

        let mut requests: BTreeMap<TypeInfo, Vec<ImportSite>> = BTreeMap::new();
        for import in candidates.imports {
            progress!(
                self.config,
                "Import {} {} in {} found",
                import.dependency.short_name(),
                import.name,
                import.owner
            );
            requests.entry(import.dependency).or_default().push(import);
        }

        let mut report = InjectionReport::default();
        while let Some(dependency) = queue.pop() {
            let type_info = dependency.type_info();
            let Some(imports) = requests.remove(&type_info) else {
                if self.config.build_unconsumed {
                    drop(dependency.build()?);
                    report.built.push(type_info);
                    debug!(dependency = type_info.name, "Built without imports");
                } else {
                    report.skipped += 1;
                    debug!(dependency = type_info.name, "No imports, skipped");
                }
                continue;
            };

            let slots = imports
                .iter()
                .map(|import| match import.target {
                    ImportTarget::Static(slot) => Ok((import, slot)),
                    ImportTarget::NonStatic => {
                        let err = InjectErrorKind::InvalidImportTarget {
                            owner: import.owner,
                            field: import.name,
                        };
                        error!("{}", err);
                        Err(err)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            let value = dependency.build()?;
            report.built.push(type_info);

            for (import, slot) in slots {
                if let Err(value) = slot.assign(value.clone()) {
                    let err = InjectErrorKind::IncorrectType {
                        expected: import.dependency,
                        actual: (*value).type_id(),
                    };
                    error!("{}", err);
                    return Err(err);
                }
                report.assigned += 1;
                progress!(
                    self.config,
                    "Import {} {} in {} injected",
                    import.dependency.short_name(),
                    import.name,
                    import.owner
                );
            }
        }

        if let Some((dependency, imports)) = requests.into_iter().next() {
            let required_by = imports.first().map_or(RequiredBy::Lookup, |import| RequiredBy::Import {
                owner: import.owner,
                field: import.name,
            });
            let err = InjectErrorKind::NoFactoryAvailable { dependency, required_by };
            error!("{}", err);
            return Err(err);
        }

        progress!(self.config, "Injection completed");
        Ok(report)
    }

    /// Creates a context that builds the dependencies found under the namespace on request
    ///
    /// # Errors
    /// - Returns [`InjectErrorKind::Discovery`] if the namespace or one of the index entries is invalid
    /// - Returns [`InjectErrorKind::TooManyFactories`] and [`InjectErrorKind::InvalidFactoryDefinition`] if a component is misconfigured
    pub fn context(&self, namespace: &str) -> Result<Context, InjectErrorKind> {
        let namespace = Namespace::new(namespace).map_err(|err| {
            error!("{}", err);
            InjectErrorKind::from(err)
        })?;
        let candidates = self.candidates(&namespace)?;

        let mut dependencies = self.instances.clone();
        for component in &candidates.components {
            dependencies.extend(Dependency::collect(component)?);
        }
        Ok(Context::from_dependencies(dependencies))
    }

    fn candidates(&self, namespace: &Namespace) -> Result<Candidates, InjectErrorKind> {
        let discovered = self.discovery.discover(namespace)?;

        let mut candidates = Candidates::default();
        candidates.merge(self.components.iter().cloned(), self.imports.iter().copied());
        candidates.merge(discovered.components, discovered.imports);
        Ok(candidates)
    }
}
