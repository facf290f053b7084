//! # Jabcom Testkit
//!
//! Test utilities for Jabcom.
//!
//! This crate provides:
//! - Test entities and datastore helpers
//! - Property-based test generators using proptest
//! - Concurrent save helpers for stress tests
//!
//! ## Usage
//!
//! ```rust
//! use jabcom_testkit::prelude::*;
//! use jabcom_core::Dao;
//!
//! with_temp_datastore(|datastore| {
//!     let mut parent = TestParentObject::named("first");
//!     let key = datastore.dao::<TestParentObject>().save(&mut parent).unwrap();
//!     assert!(key.is_complete());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
