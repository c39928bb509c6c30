//! Describes dependency injection errors

use crate::ServiceName;
use std::fmt::{Display, Formatter};

/// Errors produced while registering or resolving services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A name, dependency list or factory failed its shape check at registration time
    Validation(String),

    /// No definition is registered for the service
    NotRegistered(ServiceName),

    /// The implementation was never bound to the interface
    Unbound {
        /// Interface that was asked for the implementation
        interface: ServiceName,
        /// Requested implementation name
        implementation: ServiceName,
    },

    /// The resolved instance is not of the requested type
    TypeMismatch {
        /// Service whose instance could not be downcast
        service: ServiceName,
        /// Requested type name
        expected: &'static str,
    },

    /// Every handle to the container was dropped while a [`crate::Binder`] was still alive
    ContainerMissing,

    /// Failure reported by a user factory
    Other(String),
}

impl Error {
    /// Creates an [`Error::Other`] from a factory failure message
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[inline]
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns `true` if this is a registration-time shape error
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if the requested service has no definition
    #[inline]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered(_))
    }

    /// Returns `true` if an interface was asked for an implementation it doesn't have
    #[inline]
    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "Services Error: invalid registration: {msg}"),
            Error::NotRegistered(name) => write!(f, "Services Error: service not registered: {name}"),
            Error::Unbound { interface, implementation } => write!(
                f,
                "Services Error: there is no implementation {implementation} for {interface}"
            ),
            Error::TypeMismatch { service, expected } => write!(
                f,
                "Services Error: service {service} is not of type {expected}"
            ),
            Error::ContainerMissing => write!(f, "Services Error: DI container is missing"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
