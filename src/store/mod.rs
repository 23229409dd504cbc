//! # Store Module
//!
//! Flat-file JSON datastore. The backing file is a single JSON object whose
//! top-level keys are resources: arrays of objects are collections, objects
//! are singular resources.
//!
//! ## Snapshots
//!
//! The in-memory state is an immutable [`Snapshot`] held in an
//! [`arc_swap::ArcSwapOption`]. Readers call [`DataStore::snapshot`] once per
//! request and run every step against that snapshot, so a reload that lands
//! mid-request is never observed halfway.
//!
//! Writers (mutations and reloads) are serialized by a lock. A mutation
//! clones the current snapshot, applies the change, persists the file with a
//! temp-file-and-rename, then swaps the handle.
//!
//! ## Availability
//!
//! Until the first successful load the handle is empty and every request is
//! rejected by the normalizer. A failed reload leaves the previous snapshot
//! in place.

mod crud;
mod datastore;
pub mod schema;
mod snapshot;
pub mod values;

pub use crud::{list_records, ListOutcome};
pub use datastore::DataStore;
pub use snapshot::{Record, Resource, Snapshot};

use std::io;
use std::path::PathBuf;

/// Errors raised by the datastore.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("database root must be a JSON object")]
    RootNotObject,
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),
    #[error("'{0}' is not a collection")]
    NotACollection(String),
    #[error("'{0}' is not a singular resource")]
    NotSingular(String),
    #[error("record with id {id} already exists in '{collection}'")]
    DuplicateId { collection: String, id: String },
    #[error("database is not loaded")]
    NotLoaded,
    #[error("writer lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Whether the error means the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UnknownCollection(_) | StoreError::NotACollection(_) | StoreError::NotSingular(_)
        )
    }
}
