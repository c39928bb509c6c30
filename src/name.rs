//! Service names and dependency lists accepted by the registration methods

use crate::error::Error;
use smallvec::SmallVec;
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    ops::Deref,
    sync::Arc
};

/// A non-empty identifier of a service, a factory or an interface.
///
/// Cheap to clone and usable as `&str` in lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(Arc<str>);

impl ServiceName {
    /// Validates and creates a service name
    ///
    /// # Example
    /// ```
    /// use contadi::ServiceName;
    ///
    /// assert!(ServiceName::new("beer").is_ok());
    /// assert!(ServiceName::new("  ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("Service name missing!"));
        }
        Ok(Self(name.into()))
    }

    /// Wraps a looked-up name for error reporting without validating it
    #[inline]
    pub(crate) fn lookup(name: &str) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceName {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for ServiceName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ServiceName {
    type Error = Error;

    #[inline]
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<String> for ServiceName {
    type Error = Error;

    #[inline]
    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<ServiceName> for String {
    #[inline]
    fn from(name: ServiceName) -> Self {
        name.0.as_ref().to_owned()
    }
}

impl From<&ServiceName> for String {
    #[inline]
    fn from(name: &ServiceName) -> Self {
        name.0.as_ref().to_owned()
    }
}

impl PartialEq<str> for ServiceName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Ordered list of dependency names.
///
/// The order is the positional order of the factory arguments,
/// so duplicates are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(SmallVec<[ServiceName; 4]>);

impl Dependencies {
    /// An empty dependency list, used by the two-argument registration methods
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Validates every entry as a [`ServiceName`]
    pub fn new<I, S>(names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        names.into_iter()
            .map(|name| ServiceName::new(name)
                .map_err(|_| Error::validation("Dependencies must be string name of services!")))
            .collect::<Result<SmallVec<_>, _>>()
            .map(Self)
    }

    /// Number of declared dependencies
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no dependencies
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the names in positional order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceName> {
        self.0.iter()
    }

    /// Returns the names as a slice
    #[inline]
    pub fn as_slice(&self) -> &[ServiceName] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a ServiceName;
    type IntoIter = std::slice::Iter<'a, ServiceName>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
