//! Hot-reload of materialized singletons after a definition is replaced

use super::{Container, State, registry::{Definition, Kind}};
use crate::ServiceName;

impl Container {
    /// Stores the definition and hot-reloads what was built from the previous one.
    ///
    /// Must be called with the container lock held.
    pub(crate) fn define(&self, state: &State, name: ServiceName, definition: Definition, kind: Kind) {
        let replaced = state
            .borrow_mut()
            .define(name.clone(), definition, kind);
        let _replaced = replaced.is_some();
        drop(replaced);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "service {name} {}",
            if _replaced { "redefined" } else { "registered" }
        );

        self.hot_reload(state, &name);
    }

    /// Invalidates `name` and eagerly rebuilds the materialized singletons
    /// whose last construction depended on it.
    ///
    /// Only direct dependents are rebuilt. Their own dependents keep
    /// their cached instances.
    fn hot_reload(&self, state: &State, name: &ServiceName) {
        let config = &self.inner.config;

        let evicted = {
            let mut registry = state.borrow_mut();
            if config.prunes_stale_edges() {
                registry.unlink_dependent(name);
            }
            registry.evict(name)
        };
        let was_materialized = evicted.is_some();
        drop(evicted);

        if was_materialized && config.eager_self_reload() {
            self.reload(state, name);
        }

        let dependents = state.borrow().dependents_of(name);
        for dependent in dependents {
            if state.borrow().is_materialized(&dependent) {
                self.reload(state, &dependent);
            }
        }
    }

    /// Rebuilds a singleton in place.
    ///
    /// On failure the stale instance is evicted, so the next resolution reports the error.
    /// Evicted and replaced values are dropped only after the registry borrow ends,
    /// their `Drop` may call back into the container.
    fn reload(&self, state: &State, name: &ServiceName) {
        #[cfg(feature = "tracing")]
        tracing::debug!("hot-reloading {name}");

        if let Err(_err) = self.rebuild(state, name) {
            #[cfg(feature = "tracing")]
            tracing::warn!("failed to hot-reload {name}: {_err:#}");

            let evicted = state.borrow_mut().evict(name);
            drop(evicted);
        }
    }
}
