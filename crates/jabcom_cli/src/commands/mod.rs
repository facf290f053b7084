//! CLI command implementations.

pub mod compact;
pub mod dump;
pub mod get;
pub mod inspect;
pub mod key;

use crate::error::CliResult;
use jabcom_core::{Config, Datastore};
use std::path::Path;

/// Opens an existing store without creating anything.
pub(crate) fn open_store(path: &Path) -> CliResult<Datastore> {
    Ok(Datastore::open(path, Config::default().create_if_missing(false))?)
}
