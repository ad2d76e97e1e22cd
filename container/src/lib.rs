//! # Fibre Container
//!
//! A keyed, thread-safe service container for Rust.
//!
//! Values and factories are bound to string keys and resolved back on demand.
//! Factories can be memoized, keys can be grouped under namespaces, resolved
//! values can be decorated after the fact, and whole containers can be merged,
//! frozen and copied. With the `stub` feature, tests can temporarily shadow
//! any binding.
//!
//! ## Core Concepts
//!
//! - **Container**: owns an insertion-ordered [`Registry`] of keys to [`Item`]s.
//! - **Item**: a payload (inert value, zero-argument factory, or a deferred
//!   callable that takes arguments) plus its `call`/`memoize` policy.
//! - **Strategies**: a [`Registrar`] writes bindings and a [`Resolver`] reads
//!   them; both can be replaced per container through [`ContainerConfig`].
//! - **Namespaces**: prefix-scoped batches of registrations that land
//!   atomically.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_container::{Container, Item};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! struct Database {
//!   url: String,
//! }
//!
//! let container = Arc::new(Container::new());
//! container.register("config.database_url", "postgres://localhost/app".to_string()).unwrap();
//!
//! // Factories can resolve their own dependencies from the container.
//! let connections = Arc::new(AtomicUsize::new(0));
//! let (c, counter) = (container.clone(), connections.clone());
//! container
//!   .register_item(
//!     "database",
//!     Item::factory(move || {
//!       counter.fetch_add(1, Ordering::SeqCst);
//!       let url = c.resolve_as::<String>("config.database_url").unwrap();
//!       Database { url: (*url).clone() }
//!     })
//!     .memoize(true),
//!   )
//!   .unwrap();
//!
//! let db = container.resolve_as::<Database>("database").unwrap();
//! let again = container.resolve_as::<Database>("database").unwrap();
//!
//! assert_eq!(db.url, "postgres://localhost/app");
//! assert!(Arc::ptr_eq(&db, &again));
//! assert_eq!(connections.load(Ordering::SeqCst), 1);
//! ```

mod config;
mod container;
mod error;
mod host;
mod item;
mod namespace;
mod registry;
mod resolver;
#[cfg(feature = "stub")]
mod stub;

pub use config::{ContainerConfig, DEFAULT_NAMESPACE_SEPARATOR};
pub use container::Container;
pub use error::{Error, Result};
pub use host::ContainerHost;
pub use item::{Decorator, Factory, Instance, Item};
pub use namespace::{Namespace, NamespaceScope};
pub use registry::{DefaultRegistrar, Registrar, Registry};
pub use resolver::{DefaultResolver, Resolver};
