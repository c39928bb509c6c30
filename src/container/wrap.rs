//! Self-registration of named factory functions

use super::{Container, Error, Inner, factory::GenericFactory, from_instance::FromInstances, registry::Kind};
use crate::{Dependencies, ServiceName};
use std::{
    fmt::Debug,
    marker::PhantomData,
    sync::{Arc, Weak}
};

/// A zero-argument getter returned by [`Container::wrap`]
///
/// Holds a weak handle, so a getter captured by a service does not keep
/// the container alive.
pub struct Getter<T> {
    name: ServiceName,
    container: Weak<Inner>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Getter<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            container: self.container.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for Getter<T> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Getter")
            .field(&self.name)
            .finish()
    }
}

impl<T: Send + Sync + 'static> Getter<T> {
    /// Resolves the wrapped service.
    ///
    /// Fails with [`Error::ContainerMissing`] once every container handle is dropped.
    #[inline]
    pub fn get(&self) -> Result<Arc<T>, Error> {
        Container::upgrade(&self.container)?.get_shared::<T>(&self.name)
    }

    /// The name the service was registered under
    #[inline]
    pub fn name(&self) -> &ServiceName {
        &self.name
    }
}

impl Container {
    /// Registers a singleton service under the name of its factory function
    /// and returns a getter for it.
    ///
    /// The factory must be a named `fn` item: closures, function pointers and
    /// generic instantiations have no name to register under and are rejected.
    ///
    /// The name is derived from [`std::any::type_name`], whose output is not
    /// guaranteed to stay the same across compiler versions. Treat it as best-effort
    /// and use [`Container::register_service`] when the exact name matters.
    ///
    /// # Example
    /// ```
    /// use contadi::Container;
    ///
    /// fn water() -> i32 {
    ///     42
    /// }
    ///
    /// let container = Container::new();
    /// let water = container.wrap(water).unwrap();
    ///
    /// assert_eq!(water.name(), "water");
    /// assert_eq!(*water.get().unwrap(), 42);
    /// ```
    pub fn wrap<F, Args>(&self, factory: F) -> Result<Getter<F::Output>, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        self.wrap_dependencies(factory, Dependencies::none())
    }

    /// Same as [`Container::wrap`] for a factory with dependencies
    pub fn wrap_with<F, Args, I, S>(&self, factory: F, dependencies: I) -> Result<Getter<F::Output>, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances,
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.wrap_dependencies(factory, Dependencies::new(dependencies)?)
    }

    fn wrap_dependencies<F, Args>(&self, factory: F, dependencies: Dependencies) -> Result<Getter<F::Output>, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        let name = factory_name::<F>()?;
        let name = self.register(name, dependencies, factory, Kind::Service)?;
        Ok(Getter {
            name,
            container: self.downgrade(),
            _marker: PhantomData,
        })
    }
}

/// Takes the last path segment of a `fn` item type, e.g. `brewery::beer` -> `beer`
fn factory_name<F>() -> Result<ServiceName, Error> {
    let path = std::any::type_name::<F>();
    let is_ident = |segment: &str| {
        let mut chars = segment.chars();
        chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    };
    if !path.split("::").all(is_ident) {
        return Err(Error::validation("The factory has to have a name!"));
    }
    path.rsplit("::")
        .next()
        .ok_or_else(|| Error::validation("The factory has to have a name!"))
        .and_then(ServiceName::new)
}
