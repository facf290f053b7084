//! # Jabcom Storage
//!
//! Storage backend trait and implementations for Jabcom.
//!
//! Backends store [`Record`](jabcom_codec::Record)s addressed by
//! [`Key`](jabcom_codec::Key). They know nothing about entity types; the
//! entity mapper in `jabcom_core` converts domain objects to records before
//! they reach this layer.
//!
//! ## Design Principles
//!
//! - Every method takes `&self`; backends are `Send + Sync`
//! - Incomplete keys get an id at `put` time, unique per `(parent, kind)`
//! - Ids are never handed out twice
//! - Listings come back in insertion order
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage, with a
//!   stop/start switch that emulates service outages
//! - [`FileBackend`] - Persistent store backed by a checksummed record log
//!
//! ## Example
//!
//! ```rust
//! use jabcom_codec::{Key, Record};
//! use jabcom_storage::{InMemoryBackend, StorageBackend};
//!
//! let backend = InMemoryBackend::new();
//! let parent = Key::from_name("Parent", "p").unwrap();
//! backend.put(Record::new(parent.clone())).unwrap();
//! let child = backend
//!     .put(Record::new(parent.incomplete_child("Child").unwrap()))
//!     .unwrap();
//!
//! let children = backend.query_by_ancestor(&parent, "Child").unwrap();
//! assert_eq!(children[0].key(), &child);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod log;
mod memory;
mod table;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{CompactStats, FileBackend, FileOptions};
pub use memory::InMemoryBackend;
