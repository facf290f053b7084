//! # Jabcom Core
//!
//! Entity mapping and data access objects for Jabcom.
//!
//! This crate provides:
//! - [`Entity`] and [`EntitySchema`] for describing how a type maps to a record
//! - [`EntityMapper`] for converting between entities and records
//! - [`Dao`] and [`EntityDao`] for fetching, saving and deleting entities
//! - [`Datastore`], the handle that owns a backend and hands out DAOs
//!
//! ## Example
//!
//! ```rust
//! use jabcom_codec::Key;
//! use jabcom_core::{Dao, Datastore, Entity, EntitySchema};
//!
//! #[derive(Default)]
//! struct Parent {
//!     key: Option<Key>,
//! }
//!
//! #[derive(Default)]
//! struct Child {
//!     key: Option<Key>,
//!     parent: Option<Key>,
//!     name: String,
//! }
//!
//! impl Entity for Parent {
//!     fn schema() -> EntitySchema<Self> {
//!         EntitySchema::new()
//!             .identity("key", |p: &Parent| p.key.clone(), |p, k| p.key = k)
//!             .default_factory()
//!     }
//! }
//!
//! impl Entity for Child {
//!     fn schema() -> EntitySchema<Self> {
//!         EntitySchema::new()
//!             .identity("key", |c: &Child| c.key.clone(), |c, k| c.key = k)
//!             .parent("parent", |c: &Child| c.parent.clone(), |c, k| c.parent = k)
//!             .field("name", |c: &Child| c.name.clone(), |c, v| c.name = v)
//!             .default_factory()
//!     }
//! }
//!
//! let datastore = Datastore::open_in_memory();
//! let parent_key = datastore.dao::<Parent>().save(&mut Parent::default())?;
//!
//! let children = datastore.dao::<Child>();
//! for name in ["C1", "C2"] {
//!     let mut child = Child {
//!         parent: Some(parent_key.clone()),
//!         name: name.into(),
//!         ..Child::default()
//!     };
//!     children.save(&mut child)?;
//! }
//!
//! let names: Vec<String> = children
//!     .fetch_by_ancestor(&parent_key)?
//!     .into_iter()
//!     .map(|c| c.name)
//!     .collect();
//! assert_eq!(names, ["C1", "C2"]);
//! # Ok::<(), jabcom_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dao;
mod datastore;
mod entity;
mod error;

pub use config::Config;
pub use dao::{Dao, EntityDao};
pub use datastore::Datastore;
pub use entity::{Entity, EntityMapper, EntitySchema};
pub use error::{CoreError, CoreResult, MappingError, MappingResult};

pub use jabcom_codec::{Key, KeyId, Record, Value};
pub use jabcom_storage::{InMemoryBackend, StorageBackend, StorageError};
