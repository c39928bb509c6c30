//! Storage behind a [`Container`](super::Container)
//!
//! One [`Registry`] holds the five maps of a container:
//! definitions, the factory (transient) markers, the singleton cache,
//! the reverse dependency index and the interface bindings.
//! It has no resolution logic of its own.

use super::{Error, FactoryFn, Instance, factory::{GenericFactory, make_factory_fn}, from_instance::FromInstances};
use crate::{Dependencies, ServiceName};
use indexmap::IndexSet;
use std::{
    collections::{HashMap, HashSet},
    fmt::Debug
};

/// How instances of a definition are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// Built once and cached
    Service,
    /// Rebuilt on every resolution
    Factory,
}

/// A factory together with the ordered names of its dependencies
#[derive(Clone)]
pub(crate) struct Definition {
    pub(crate) factory: FactoryFn,
    pub(crate) dependencies: Dependencies,
    pub(crate) is_interface: bool,
}

impl Debug for Definition {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("dependencies", &self.dependencies)
            .field("is_interface", &self.is_interface)
            .finish_non_exhaustive()
    }
}

impl Definition {
    /// Validates the shape of a registration and erases its factory
    pub(crate) fn new<F, Args>(dependencies: Dependencies, factory: F) -> Result<Self, Error>
    where
        F: GenericFactory<Args>,
        F::Output: Send + Sync + 'static,
        Args: FromInstances
    {
        if Args::ARITY != dependencies.len() {
            return Err(Error::validation(format!(
                "factory takes {} arguments but {} dependencies are declared",
                Args::ARITY,
                dependencies.len()
            )));
        }
        Ok(Self {
            factory: make_factory_fn(factory),
            dependencies,
            is_interface: false
        })
    }

    #[inline]
    pub(crate) fn interface(factory: FactoryFn) -> Self {
        Self {
            factory,
            dependencies: Dependencies::none(),
            is_interface: true
        }
    }
}

type Dependents = IndexSet<ServiceName>;

/// The mutable state of one container
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Service name -> definition
    services: HashMap<ServiceName, Definition>,
    /// Names registered through the factory path
    factories: HashSet<ServiceName>,
    /// Materialized singletons
    instances: HashMap<ServiceName, Instance>,
    /// Dependency name -> singletons built with it
    dependents: HashMap<ServiceName, Dependents>,
    /// Interface name -> implementation names
    interfaces: HashMap<ServiceName, IndexSet<ServiceName>>,
}

impl Registry {
    /// Inserts or overwrites a definition. A factory marker, once set, stays until [`Registry::clear`]
    pub(crate) fn define(&mut self, name: ServiceName, definition: Definition, kind: Kind) -> Option<Definition> {
        if kind == Kind::Factory {
            self.factories.insert(name.clone());
        }
        self.services.insert(name, definition)
    }

    #[inline]
    pub(crate) fn definition(&self, name: &str) -> Option<(&ServiceName, &Definition)> {
        self.services.get_key_value(name)
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    #[inline]
    pub(crate) fn is_factory(&self, name: &str) -> bool {
        self.factories.contains(name)
    }

    #[inline]
    pub(crate) fn is_interface(&self, name: &str) -> bool {
        self.services
            .get(name)
            .is_some_and(|definition| definition.is_interface)
    }

    #[inline]
    pub(crate) fn cached(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    #[inline]
    pub(crate) fn is_materialized(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Caches a singleton and records a reverse edge for each dependency it was built with.
    ///
    /// Returns the replaced instance, which the caller must drop after releasing the borrow.
    pub(crate) fn store(
        &mut self,
        name: ServiceName,
        instance: Instance,
        dependencies: &Dependencies,
        prune: bool
    ) -> Option<Instance> {
        if prune {
            self.unlink_dependent(&name);
        }
        for dependency in dependencies {
            self.dependents
                .entry(dependency.clone())
                .or_default()
                .insert(name.clone());
        }
        self.instances.insert(name, instance)
    }

    #[inline]
    pub(crate) fn evict(&mut self, name: &str) -> Option<Instance> {
        self.instances.remove(name)
    }

    /// Removes every reverse edge that points at `dependent`
    pub(crate) fn unlink_dependent(&mut self, dependent: &str) {
        self.dependents.retain(|_, dependents| {
            dependents.shift_remove(dependent);
            !dependents.is_empty()
        });
    }

    pub(crate) fn dependents_of(&self, name: &str) -> Vec<ServiceName> {
        self.dependents
            .get(name)
            .map(|dependents| dependents.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `false` if the implementation was already bound
    pub(crate) fn add_implementation(&mut self, interface: ServiceName, implementation: ServiceName) -> bool {
        self.interfaces
            .entry(interface)
            .or_default()
            .insert(implementation)
    }

    #[inline]
    pub(crate) fn implements(&self, interface: &str, implementation: &str) -> bool {
        self.interfaces
            .get(interface)
            .is_some_and(|implementations| implementations.contains(implementation))
    }

    pub(crate) fn implementations_of(&self, interface: &str) -> Vec<ServiceName> {
        self.interfaces
            .get(interface)
            .map(|implementations| implementations.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn service_names(&self) -> Vec<ServiceName> {
        let mut names: Vec<_> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Empties the registry and hands back what was in it.
    ///
    /// Cached instances and factories may run user code on drop,
    /// so the caller drops the result after releasing the borrow.
    pub(crate) fn clear(&mut self, reverse_index: bool) -> Registry {
        let dependents = if reverse_index {
            std::mem::take(&mut self.dependents)
        } else {
            HashMap::new()
        };
        Registry {
            services: std::mem::take(&mut self.services),
            factories: std::mem::take(&mut self.factories),
            instances: std::mem::take(&mut self.instances),
            interfaces: std::mem::take(&mut self.interfaces),
            dependents,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;

    fn name(name: &str) -> ServiceName {
        ServiceName::new(name).unwrap()
    }

    fn definition(dependencies: &[&str]) -> Definition {
        Definition {
            factory: make_factory_fn(|| 0),
            dependencies: Dependencies::new(dependencies.iter().copied()).unwrap(),
            is_interface: false
        }
    }

    #[test]
    fn it_rejects_arity_mismatch() {
        let deps = Dependencies::new(["water"]).unwrap();

        let err = Definition::new(deps, || 42).unwrap_err();

        assert_eq!(
            err,
            Error::Validation("factory takes 0 arguments but 1 dependencies are declared".into())
        );
    }

    #[test]
    fn it_keeps_factory_marker_sticky() {
        let mut registry = Registry::default();
        registry.define(name("bottle"), definition(&[]), Kind::Factory);
        registry.define(name("bottle"), definition(&[]), Kind::Service);

        assert!(registry.is_factory("bottle"));
    }

    #[test]
    fn it_records_dependents_once() {
        let mut registry = Registry::default();
        let deps = Dependencies::new(["water", "water"]).unwrap();
        registry.store(name("beer"), Arc::new(1), &deps, true);
        registry.store(name("beer"), Arc::new(2), &deps, true);

        assert_eq!(registry.dependents_of("water"), [name("beer")]);
        assert_eq!(registry.cached("beer").unwrap().downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn it_prunes_stale_edges_on_store() {
        let mut registry = Registry::default();
        registry.store(name("beer"), Arc::new(1), &Dependencies::new(["water"]).unwrap(), true);
        registry.store(name("beer"), Arc::new(2), &Dependencies::new(["malt"]).unwrap(), true);

        assert!(registry.dependents_of("water").is_empty());
        assert_eq!(registry.dependents_of("malt"), [name("beer")]);
    }

    #[test]
    fn it_keeps_stale_edges_without_pruning() {
        let mut registry = Registry::default();
        registry.store(name("beer"), Arc::new(1), &Dependencies::new(["water"]).unwrap(), false);
        registry.store(name("beer"), Arc::new(2), &Dependencies::new(["malt"]).unwrap(), false);

        assert_eq!(registry.dependents_of("water"), [name("beer")]);
        assert_eq!(registry.dependents_of("malt"), [name("beer")]);
    }

    #[test]
    fn it_collapses_duplicate_implementations() {
        let mut registry = Registry::default();

        assert!(registry.add_implementation(name("water"), name("cleanedWater")));
        assert!(registry.add_implementation(name("water"), name("boiledWater")));
        assert!(!registry.add_implementation(name("water"), name("cleanedWater")));

        assert_eq!(registry.implementations_of("water"), [name("cleanedWater"), name("boiledWater")]);
        assert!(registry.implements("water", "boiledWater"));
        assert!(!registry.implements("water", "sparklingWater"));
    }

    #[test]
    fn it_clears_all_but_reverse_index_when_asked() {
        let mut registry = Registry::default();
        registry.define(name("water"), definition(&[]), Kind::Factory);
        registry.store(name("beer"), Arc::new(1), &Dependencies::new(["water"]).unwrap(), true);
        registry.add_implementation(name("drink"), name("beer"));

        registry.clear(false);

        assert!(!registry.contains("water"));
        assert!(!registry.is_factory("water"));
        assert!(!registry.is_materialized("beer"));
        assert!(registry.implementations_of("drink").is_empty());
        assert_eq!(registry.dependents_of("water"), [name("beer")]);

        registry.clear(true);

        assert!(registry.dependents_of("water").is_empty());
    }
}
