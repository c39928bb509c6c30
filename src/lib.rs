//! # contadi
//!
//! > Minimal dependency injection container: named services with declared
//! > dependencies, resolved, instantiated and cached on demand.
//!
//! ## Features
//! * Singleton services and transient factories
//! * Positional, typed dependencies resolved depth-first
//! * Hot-reload: replacing a definition rebuilds the singletons already built from it
//! * Named interfaces with explicitly selected implementations
//! * Independent, thread-safe containers, no global state
//!
//! ## Example
//! ```
//! use contadi::Container;
//!
//! let container = Container::new();
//!
//! container.register_service("water", || 42).unwrap();
//! container.register_service("malt", || 43).unwrap();
//! container.register_service_with("beer", ["water", "malt"], |water: i32, malt: i32| {
//!     Ok(water + malt)
//! }).unwrap();
//!
//! assert_eq!(container.get::<i32>("beer").unwrap(), 85);
//!
//! container.change("beer", |water: i32, malt: i32| Ok(water * malt)).unwrap();
//!
//! assert_eq!(container.get::<i32>("beer").unwrap(), 1806);
//! ```
//!
//! ## Cargo features
//! * `tracing` - emits [`tracing`](https://docs.rs/tracing) events on registration, resolution and hot-reload
//! * `serde` - allows deserializing [`Config`]

#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

pub mod config;
pub mod container;
pub mod error;
pub mod interface;
pub mod name;

pub use crate::{
    config::Config,
    container::{Container, FromInstance, GenericFactory, Getter, Instance},
    error::Error,
    interface::Binder,
    name::{Dependencies, ServiceName},
};
