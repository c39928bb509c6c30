//! Named interfaces with explicitly selected implementations
//!
//! An interface is registered as a singleton pseudo-service whose instance is a
//! [`Binder`]. Services depend on the interface name like on any other service
//! and pick the implementation they need by name when they call the binder.

use crate::{
    Container, Instance, ServiceName,
    container::{Inner, downcast, registry::{Definition, Kind}},
    error::Error
};
use std::{
    fmt::Debug,
    sync::{Arc, Weak}
};

/// Resolves the implementations bound to one interface
///
/// # Example
/// ```
/// use contadi::{Binder, Container};
///
/// let container = Container::new();
/// container.register_service("cleanedWater", || "cleaned").unwrap();
/// container.register_service("boiledWater", || "boiled").unwrap();
/// container.bind_implementation("water", "cleanedWater").unwrap();
/// container.bind_implementation("water", "boiledWater").unwrap();
///
/// container.register_service_with("bottle", ["water"], |water: Binder| {
///     water.resolve::<&str>("cleanedWater")
/// }).unwrap();
///
/// assert_eq!(container.get::<&str>("bottle").unwrap(), "cleaned");
/// ```
#[derive(Clone)]
pub struct Binder {
    interface: ServiceName,
    container: Weak<Inner>,
}

impl Debug for Binder {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// The interface this binder resolves implementations for
    #[inline]
    pub fn interface(&self) -> &ServiceName {
        &self.interface
    }

    /// Resolves a bound implementation and returns a cloned instance
    #[inline]
    pub fn resolve<T: Send + Sync + Clone + 'static>(&self, implementation: &str) -> Result<T, Error> {
        self.resolve_shared::<T>(implementation)
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a bound implementation and returns a shared pointer
    #[inline]
    pub fn resolve_shared<T: Send + Sync + 'static>(&self, implementation: &str) -> Result<Arc<T>, Error> {
        self.resolve_instance(implementation)
            .and_then(|instance| downcast(implementation, instance))
    }

    /// Resolves a bound implementation without downcasting it
    pub fn resolve_instance(&self, implementation: &str) -> Result<Instance, Error> {
        Container::upgrade(&self.container)?
            .resolve_implementation_instance(&self.interface, implementation)
    }

    /// Returns the implementations bound so far, in binding order
    pub fn implementations(&self) -> Result<Vec<ServiceName>, Error> {
        Container::upgrade(&self.container)
            .map(|container| container.implementations_of(&self.interface))
    }
}

impl Container {
    /// Binds `service` as an implementation of `interface`.
    ///
    /// Binding the same pair twice is a no-op. The first binding registers
    /// `interface` as a singleton whose instance is a [`Binder`].
    pub fn bind_implementation(
        &self,
        interface: impl Into<String>,
        service: impl Into<String>
    ) -> Result<(), Error> {
        let interface = ServiceName::new(interface)?;
        let service = ServiceName::new(service)?;

        let state = self.inner.state.lock();
        let is_defined = state.borrow().is_interface(&interface);
        if !is_defined {
            let binder = Binder {
                interface: interface.clone(),
                container: self.downgrade(),
            };
            let factory = Arc::new(move |_: &[ServiceName], _: &[Instance]| -> Result<Instance, Error> {
                Ok(Arc::new(binder.clone()) as Instance)
            });
            self.define(&state, interface.clone(), Definition::interface(factory), Kind::Service);
        }

        let _added = state
            .borrow_mut()
            .add_implementation(interface.clone(), service.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "{service} bound to interface {interface}{}",
            if _added { "" } else { " (already bound)" }
        );

        Ok(())
    }

    /// Resolves `implementation` through `interface` and returns a cloned instance.
    ///
    /// Fails with [`Error::Unbound`] if `implementation` was never bound to `interface`.
    #[inline]
    pub fn resolve_implementation<T: Send + Sync + Clone + 'static>(
        &self,
        interface: &str,
        implementation: &str
    ) -> Result<T, Error> {
        self.resolve_implementation_instance(interface, implementation)
            .and_then(|instance| downcast::<T>(implementation, instance))
            .map(|s| s.as_ref().clone())
    }

    /// Resolves `implementation` through `interface` without downcasting it
    pub fn resolve_implementation_instance(
        &self,
        interface: &str,
        implementation: &str
    ) -> Result<Instance, Error> {
        let state = self.inner.state.lock();
        let is_bound = state.borrow().implements(interface, implementation);
        if !is_bound {
            return Err(Error::Unbound {
                interface: ServiceName::lookup(interface),
                implementation: ServiceName::lookup(implementation),
            });
        }
        self.resolve(&state, implementation)
    }

    /// Returns the implementations bound to `interface`, in binding order
    pub fn implementations_of(&self, interface: &str) -> Vec<ServiceName> {
        self.inner.state.lock().borrow().implementations_of(interface)
    }
}
