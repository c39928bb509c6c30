//! Recursive resolution of services

use super::{Container, Error, FactoryFn, Instance, State, registry::Registry};
use crate::{Dependencies, ServiceName};
use smallvec::SmallVec;

/// Everything needed to construct a service once the registry borrow is released
struct Construction {
    name: ServiceName,
    factory: FactoryFn,
    dependencies: Dependencies,
    transient: bool,
}

impl Construction {
    fn plan(registry: &Registry, name: &str) -> Result<Self, Error> {
        let (key, definition) = registry
            .definition(name)
            .ok_or_else(|| Error::NotRegistered(ServiceName::lookup(name)))?;
        Ok(Self {
            name: key.clone(),
            factory: definition.factory.clone(),
            dependencies: definition.dependencies.clone(),
            transient: registry.is_factory(name),
        })
    }
}

impl Container {
    /// Returns the cached singleton or constructs the service.
    ///
    /// Must be called with the container lock held.
    pub(crate) fn resolve(&self, state: &State, name: &str) -> Result<Instance, Error> {
        let construction = {
            let registry = state.borrow();
            let construction = Construction::plan(&registry, name)?;
            if !construction.transient {
                if let Some(instance) = registry.cached(name) {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("resolved cached instance of {name}");
                    return Ok(instance.clone());
                }
            }
            construction
        };
        self.construct(state, construction)
    }

    /// Constructs the service ignoring any cached instance.
    ///
    /// Must be called with the container lock held.
    pub(crate) fn rebuild(&self, state: &State, name: &str) -> Result<Instance, Error> {
        let construction = Construction::plan(&state.borrow(), name)?;
        self.construct(state, construction)
    }

    fn construct(&self, state: &State, construction: Construction) -> Result<Instance, Error> {
        let Construction { name, factory, dependencies, transient } = construction;

        let instances = dependencies
            .iter()
            .map(|dependency| self.resolve(state, dependency))
            .collect::<Result<SmallVec<[Instance; 4]>, _>>()?;

        #[cfg(feature = "tracing")]
        tracing::trace!("constructing {name}");

        let instance = factory(dependencies.as_slice(), &instances)?;
        if !transient {
            let replaced = state.borrow_mut().store(
                name,
                instance.clone(),
                &dependencies,
                self.inner.config.prunes_stale_edges()
            );
            drop(replaced);
        }
        Ok(instance)
    }
}
