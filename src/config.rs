//! Container behaviour configuration

/// Represents a container configuration
///
/// # Example
/// ```
/// use contadi::{Config, Container};
///
/// let config = Config::new().with_eager_self_reload();
/// let container = Container::with_config(config);
///
/// assert!(container.config().eager_self_reload());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Config {
    /// Specifies whether reverse-dependency edges recorded for an older
    /// construction of a service are removed when it is rebuilt or redefined
    ///
    /// Default: `true`
    prune_stale_edges: bool,

    /// Specifies whether [`Container::reset`](crate::Container::reset)
    /// clears the reverse dependency index as well
    ///
    /// Default: `true`
    reset_reverse_index: bool,

    /// Specifies whether a re-registered service that was already materialized
    /// is rebuilt immediately instead of on its next resolution
    ///
    /// Default: `false`
    eager_self_reload: bool,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            prune_stale_edges: true,
            reset_reverse_index: true,
            eager_self_reload: false,
        }
    }
}

impl Config {
    /// Creates a default container configuration
    ///
    /// Defaults:
    /// - prune_stale_edges: `true`
    /// - reset_reverse_index: `true`
    /// - eager_self_reload: `false`
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps reverse-dependency edges of superseded constructions,
    /// so dependents that no longer use a service are still rebuilt when it changes
    ///
    /// Default: edges are pruned
    pub fn without_edge_pruning(mut self) -> Self {
        self.prune_stale_edges = false;
        self
    }

    /// Keeps the reverse dependency index across [`Container::reset`](crate::Container::reset)
    ///
    /// Default: the index is cleared
    pub fn keep_reverse_index_on_reset(mut self) -> Self {
        self.reset_reverse_index = false;
        self
    }

    /// Rebuilds a materialized service as soon as it is re-registered
    ///
    /// Default: `false`
    pub fn with_eager_self_reload(mut self) -> Self {
        self.eager_self_reload = true;
        self
    }

    /// Returns `true` if stale reverse-dependency edges are removed
    #[inline]
    pub fn prunes_stale_edges(&self) -> bool {
        self.prune_stale_edges
    }

    /// Returns `true` if reset clears the reverse dependency index
    #[inline]
    pub fn resets_reverse_index(&self) -> bool {
        self.reset_reverse_index
    }

    /// Returns `true` if re-registered services are rebuilt immediately
    #[inline]
    pub fn eager_self_reload(&self) -> bool {
        self.eager_self_reload
    }
}
