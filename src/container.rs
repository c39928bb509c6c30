//! Dependency Injection container and tools

use crate::{Config, Dependencies, ServiceName, error::Error};
use parking_lot::ReentrantMutex;
use registry::{Definition, Kind, Registry};
use std::{
    any::Any,
    cell::RefCell,
    fmt::Debug,
    sync::{Arc, Weak}
};

pub use self::{
    factory::GenericFactory,
    from_instance::{FromInstance, FromInstances},
    wrap::Getter,
};

pub mod factory;
pub mod from_instance;
pub mod wrap;
pub(crate) mod registry;
mod reload;
mod resolve;

/// An opaque value produced by a factory
pub type Instance = Arc<
    dyn Any
    + Send
    + Sync
>;

/// A type-erased factory: dependency names and their resolved instances, in declaration order
pub(crate) type FactoryFn = Arc<
    dyn Fn(&[ServiceName], &[Instance]) -> Result<Instance, Error>
    + Send
    + Sync
>;

/// Registry state guarded by the container lock
pub(crate) type State = RefCell<Registry>;

pub(crate) struct Inner {
    pub(crate) config: Config,
    pub(crate) state: ReentrantMutex<State>,
}

/// Represents a DI container: a registry of named services that resolves,
/// instantiates and caches them on demand.
///
/// Cloning a container is cheap, clones share the same registrations.
/// Every operation takes the container lock for its whole duration,
/// so a resolution together with the hot-reload it may trigger is atomic
/// for other threads. The lock is re-entrant: factories and [`Binder`](crate::Binder)s
/// may call back into the container on the same thread.
///
/// Circular dependencies are not detected and overflow the stack.
///
/// # Example
/// ```
/// use contadi::Container;
///
/// let container = Container::new();
/// container.register_service("water", || 42).unwrap();
/// container.register_service("malt", || 43).unwrap();
/// container.register_service_with("beer", ["water", "malt"], |water: i32, malt: i32| Ok(water + malt)).unwrap();
///
/// assert_eq!(container.get::<i32>("beer").unwrap(), 85);
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<Inner>,
}

impl Debug for Container {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container with the default [`Config`]
    #[inline]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty container with a specific [`Config`]
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: ReentrantMutex::new(RefCell::new(Registry::default())),
            }),
        }
    }

    /// Returns the active configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[inline]
    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    #[inline]
    pub(crate) fn upgrade(inner: &Weak<Inner>) -> Result<Self, Error> {
        inner.upgrade()
            .map(|inner| Self { inner })
            .ok_or(Error::ContainerMissing)
    }

    /// Registers a singleton service without dependencies.
    ///
    /// Returns the validated name. Re-registering an existing name replaces its
    /// definition and hot-reloads the singletons that were built from it.
    pub fn register_service<F, Args>(&self, name: impl Into<String>, factory: F) -> Result<ServiceName, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        self.register(name, Dependencies::none(), factory, Kind::Service)
    }

    /// Registers a singleton service whose factory receives `dependencies` positionally
    pub fn register_service_with<F, Args, I, S>(
        &self,
        name: impl Into<String>,
        dependencies: I,
        factory: F
    ) -> Result<ServiceName, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances,
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.register(name, Dependencies::new(dependencies)?, factory, Kind::Service)
    }

    /// Registers a transient factory without dependencies: it is invoked on every resolution
    /// and its output is never cached.
    ///
    /// A name registered as a factory stays transient until [`Container::reset`],
    /// even if it is later re-registered as a service.
    pub fn register_factory<F, Args>(&self, name: impl Into<String>, factory: F) -> Result<ServiceName, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        self.register(name, Dependencies::none(), factory, Kind::Factory)
    }

    /// Registers a transient factory whose factory function receives `dependencies` positionally
    pub fn register_factory_with<F, Args, I, S>(
        &self,
        name: impl Into<String>,
        dependencies: I,
        factory: F
    ) -> Result<ServiceName, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances,
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.register(name, Dependencies::new(dependencies)?, factory, Kind::Factory)
    }

    fn register<F, Args>(
        &self,
        name: impl Into<String>,
        dependencies: Dependencies,
        factory: F,
        kind: Kind
    ) -> Result<ServiceName, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        let name = ServiceName::new(name)?;
        let definition = Definition::new(dependencies, factory)?;

        let state = self.inner.state.lock();
        self.define(&state, name.clone(), definition, kind);
        Ok(name)
    }

    /// Replaces the factory of `name` keeping its dependency list.
    ///
    /// Runs the same hot-reload as a re-registration and then rebuilds `name`
    /// itself if it was materialized. If that rebuild fails the error is returned,
    /// the new definition stays in place and `name` is left unmaterialized.
    ///
    /// Interface names are rejected with [`Error::Validation`]: their factory is the
    /// binder created by [`Container::bind_implementation`].
    ///
    /// # Example
    /// ```
    /// use contadi::Container;
    ///
    /// let container = Container::new();
    /// container.register_service("water", || 42).unwrap();
    /// container.register_service_with("beer", ["water"], |water: i32| Ok(water + 1)).unwrap();
    /// assert_eq!(container.get::<i32>("beer").unwrap(), 43);
    ///
    /// container.change("beer", |water: i32| Ok(water * 2)).unwrap();
    /// assert_eq!(container.get::<i32>("beer").unwrap(), 84);
    /// ```
    pub fn change<F, Args>(&self, name: &str, factory: F) -> Result<(), Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        let state = self.inner.state.lock();
        let (name, dependencies, is_factory, was_materialized) = {
            let registry = state.borrow();
            let (key, definition) = registry
                .definition(name)
                .ok_or_else(|| Error::NotRegistered(ServiceName::lookup(name)))?;
            if definition.is_interface {
                return Err(Error::validation(format!("{key} is an interface, its binder cannot be changed")));
            }
            (
                key.clone(),
                definition.dependencies.clone(),
                registry.is_factory(name),
                registry.is_materialized(name)
            )
        };

        let kind = if is_factory { Kind::Factory } else { Kind::Service };
        let definition = Definition::new(dependencies, factory)?;
        self.define(&state, name.clone(), definition, kind);

        let rebuilt = state.borrow().is_materialized(&name);
        if was_materialized && !rebuilt {
            self.rebuild(&state, &name)?;
        }
        Ok(())
    }

    /// Resolves a service and returns a cloned instance.
    /// `T` must implement [`Clone`] otherwise use [`Container::get_shared`] method
    /// that returns a shared pointer.
    #[inline]
    pub fn get<T: Send + Sync + Clone + 'static>(&self, name: &str) -> Result<T, Error> {
        self.get_shared::<T>(name)
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a service and returns a shared pointer.
    ///
    /// For a singleton, every call returns a pointer to the same cached instance.
    #[inline]
    pub fn get_shared<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.get_instance(name)
            .and_then(|instance| downcast(name, instance))
    }

    /// Resolves a service without downcasting it
    pub fn get_instance(&self, name: &str) -> Result<Instance, Error> {
        let state = self.inner.state.lock();
        self.resolve(&state, name)
    }

    /// Returns `true` if a definition is registered for `name`
    #[inline]
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.state.lock().borrow().contains(name)
    }

    /// Returns `true` if `name` was registered through the factory (transient) path
    #[inline]
    pub fn is_factory(&self, name: &str) -> bool {
        self.inner.state.lock().borrow().is_factory(name)
    }

    /// Returns `true` if `name` currently has a cached singleton instance
    #[inline]
    pub fn is_materialized(&self, name: &str) -> bool {
        self.inner.state.lock().borrow().is_materialized(name)
    }

    /// Returns the materialized singletons that were built with `name` among their dependencies,
    /// in the order they were first recorded
    pub fn dependents_of(&self, name: &str) -> Vec<ServiceName> {
        self.inner.state.lock().borrow().dependents_of(name)
    }

    /// Returns all registered names, sorted
    pub fn service_names(&self) -> Vec<ServiceName> {
        self.inner.state.lock().borrow().service_names()
    }

    /// Clears definitions, factory markers, cached instances and interface bindings.
    ///
    /// The reverse dependency index is cleared too unless the container was
    /// configured with [`Config::keep_reverse_index_on_reset`].
    pub fn reset(&self) {
        let state = self.inner.state.lock();
        let cleared = state
            .borrow_mut()
            .clear(self.inner.config.resets_reverse_index());
        drop(cleared);

        #[cfg(feature = "tracing")]
        tracing::debug!("container reset");
    }
}

#[inline]
pub(crate) fn downcast<T: Send + Sync + 'static>(name: &str, instance: Instance) -> Result<Arc<T>, Error> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::TypeMismatch {
            service: ServiceName::lookup(name),
            expected: std::any::type_name::<T>()
        })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    };
    use super::{Config, Container, Error};

    #[derive(Clone, Default)]
    struct InMemoryCache {
        inner: Arc<parking_lot::Mutex<Vec<String>>>
    }

    #[test]
    fn it_registers_singleton() {
        let container = Container::new();
        container.register_service("cache", InMemoryCache::default).unwrap();

        let cache = container.get::<InMemoryCache>("cache").unwrap();
        cache.inner.lock().push("value".into());

        let cache = container.get::<InMemoryCache>("cache").unwrap();

        assert_eq!(cache.inner.lock().as_slice(), ["value"]);
    }

    #[test]
    fn it_registers_transient() {
        let container = Container::new();
        container.register_factory("cache", InMemoryCache::default).unwrap();

        let cache = container.get::<InMemoryCache>("cache").unwrap();
        cache.inner.lock().push("value".into());

        let cache = container.get::<InMemoryCache>("cache").unwrap();

        assert!(cache.inner.lock().is_empty());
        assert!(!container.is_materialized("cache"));
    }

    #[test]
    fn it_returns_same_pointer_for_singleton() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        let counter = calls.clone();
        container.register_service("beer", move || counter.fetch_add(1, Ordering::SeqCst)).unwrap();

        let first = container.get_shared::<usize>("beer").unwrap();
        let second = container.get_shared::<usize>("beer").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_returns_error_when_resolve_unregistered() {
        let container = Container::new();

        let err = container.get::<i32>("thereisnosuch").unwrap_err();

        assert_eq!(err.to_string(), "Services Error: service not registered: thereisnosuch");
    }

    #[test]
    fn it_returns_error_for_unregistered_dependency() {
        let container = Container::new();
        container.register_service_with("beer", ["depen"], |d: i32| Ok(d)).unwrap();

        let err = container.get::<i32>("beer").unwrap_err();

        assert!(matches!(err, Error::NotRegistered(name) if name == "depen"));
    }

    #[test]
    fn it_returns_type_mismatch() {
        let container = Container::new();
        container.register_service("water", || 42_i32).unwrap();

        let err = container.get::<String>("water").unwrap_err();

        assert!(matches!(err, Error::TypeMismatch { ref service, .. } if service == "water"));
    }

    #[test]
    fn it_validates_registration() {
        let container = Container::new();

        assert!(container.register_service("", || 1).unwrap_err().is_validation());
        assert!(container.register_service_with("beer", ["water", ""], |_: i32, _: i32| Ok(1)).unwrap_err().is_validation());
        assert!(container.register_service_with("beer", ["water"], || 1).unwrap_err().is_validation());
        assert!(!container.is_registered("beer"));
    }

    #[test]
    fn it_returns_registered_name() {
        let container = Container::new();

        let name = container.register_service("beer", || 1).unwrap();

        assert_eq!(name, "beer");
        assert!(container.is_registered("beer"));
        assert!(!container.is_factory("beer"));
    }

    #[test]
    fn it_resets() {
        let container = Container::new();
        container.register_service("beer", || 1).unwrap();
        container.get::<i32>("beer").unwrap();

        container.reset();
        container.reset();

        assert!(container.get::<i32>("beer").unwrap_err().is_not_registered());
        assert!(container.service_names().is_empty());
    }

    #[test]
    fn it_fails_to_change_unregistered() {
        let container = Container::new();

        let err = container.change("beer", || 1).unwrap_err();

        assert!(err.is_not_registered());
    }

    #[test]
    fn it_validates_changed_factory_arity() {
        let container = Container::new();
        container.register_service("water", || 42).unwrap();
        container.register_service_with("beer", ["water"], |water: i32| Ok(water)).unwrap();

        let err = container.change("beer", || 0).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(container.get::<i32>("beer").unwrap(), 42);
    }

    #[test]
    fn it_keeps_clones_in_sync() {
        let container = Container::with_config(Config::new());
        let clone = container.clone();
        container.register_service("beer", || 1).unwrap();

        assert_eq!(clone.get::<i32>("beer").unwrap(), 1);
    }
}
