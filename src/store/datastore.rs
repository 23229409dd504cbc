use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use super::schema::ID_FIELD;
use super::snapshot::{Record, Resource, Snapshot};
use super::StoreError;
use crate::ids::new_record_id;

/// File-backed JSON datastore with an atomically swappable snapshot.
#[derive(Debug)]
pub struct DataStore {
    path: PathBuf,
    current: ArcSwapOption<Snapshot>,
    writer: Mutex<()>,
}

impl DataStore {
    /// Create a store for `path` without touching the file. The store stays
    /// unavailable until [`DataStore::load`] succeeds.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            current: ArcSwapOption::empty(),
            writer: Mutex::new(()),
        }
    }

    /// Create a store and attempt the initial load. A failed load is logged
    /// and leaves the store unavailable.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let store = Self::new(path);
        if let Err(e) = store.load() {
            error!(path = %store.path.display(), error = %e, "Error loading database");
        }
        store
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot, `None` while the database has never loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.current.load().is_some()
    }

    /// Read and parse the backing file and swap it in.
    ///
    /// On failure the previous snapshot (if any) stays active.
    pub fn load(&self) -> Result<Arc<Snapshot>, StoreError> {
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = Arc::new(Snapshot::from_json_str(&raw)?);
        self.current.store(Some(Arc::clone(&snapshot)));
        info!(
            path = %self.path.display(),
            resources = snapshot.names().count(),
            "Database loaded successfully"
        );
        Ok(snapshot)
    }

    /// Append `record` to `collection`, generating an id when it has none.
    pub fn insert(&self, collection: &str, mut record: Record) -> Result<Record, StoreError> {
        let inserted = self.mutate(|snap| {
            let records = snap.collection_mut(collection)?;
            match record.id_value() {
                None | Some(Value::Null) => record.set(ID_FIELD, Value::String(new_record_id())),
                Some(id) => {
                    let id = stringify_id(id);
                    if records.iter().any(|r| r.id_matches(&id)) {
                        return Err(StoreError::DuplicateId {
                            collection: collection.to_string(),
                            id,
                        });
                    }
                }
            }
            records.push(record.clone());
            Ok(Some(record))
        })?;
        inserted.ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
    }

    /// Replace the record with `id`, keeping its stored id. `Ok(None)` if absent.
    pub fn replace(&self, collection: &str, id: &str, mut record: Record) -> Result<Option<Record>, StoreError> {
        self.mutate(|snap| {
            let records = snap.collection_mut(collection)?;
            let Some(slot) = records.iter_mut().find(|r| r.id_matches(id)) else {
                return Ok(None);
            };
            if let Some(stored_id) = slot.id_value() {
                record.set(ID_FIELD, stored_id.clone());
            }
            *slot = record.clone();
            Ok(Some(record))
        })
    }

    /// Shallow-merge `patch` into the record with `id`, keeping its stored id.
    pub fn patch(&self, collection: &str, id: &str, patch: &Record) -> Result<Option<Record>, StoreError> {
        self.mutate(|snap| {
            let records = snap.collection_mut(collection)?;
            let Some(slot) = records.iter_mut().find(|r| r.id_matches(id)) else {
                return Ok(None);
            };
            let stored_id = slot.id_value().cloned();
            slot.merge(patch);
            if let Some(stored_id) = stored_id {
                slot.set(ID_FIELD, stored_id);
            }
            Ok(Some(slot.clone()))
        })
    }

    /// Remove the record with `id`. `Ok(None)` if absent.
    pub fn remove(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        self.mutate(|snap| {
            let records = snap.collection_mut(collection)?;
            let Some(pos) = records.iter().position(|r| r.id_matches(id)) else {
                return Ok(None);
            };
            Ok(Some(records.remove(pos)))
        })
    }

    /// Replace a singular resource wholesale.
    pub fn replace_singular(&self, name: &str, record: Record) -> Result<Record, StoreError> {
        self.mutate(|snap| match snap.resource_mut(name) {
            Some(Resource::Singular(slot)) => {
                *slot = record.clone();
                Ok(Some(record))
            }
            Some(_) => Err(StoreError::NotSingular(name.to_string())),
            None => Err(StoreError::UnknownCollection(name.to_string())),
        })?
        .ok_or_else(|| StoreError::NotSingular(name.to_string()))
    }

    /// Shallow-merge into a singular resource.
    pub fn patch_singular(&self, name: &str, patch: &Record) -> Result<Record, StoreError> {
        self.mutate(|snap| match snap.resource_mut(name) {
            Some(Resource::Singular(slot)) => {
                slot.merge(patch);
                Ok(Some(slot.clone()))
            }
            Some(_) => Err(StoreError::NotSingular(name.to_string())),
            None => Err(StoreError::UnknownCollection(name.to_string())),
        })?
        .ok_or_else(|| StoreError::NotSingular(name.to_string()))
    }

    /// Apply `f` to a copy of the current snapshot. When `f` yields `Some`,
    /// the copy is persisted and swapped in; `None` leaves everything as is.
    fn mutate<T, F>(&self, f: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut Snapshot) -> Result<Option<T>, StoreError>,
    {
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        let current = self.current.load_full().ok_or(StoreError::NotLoaded)?;
        let mut next = (*current).clone();
        let Some(out) = f(&mut next)? else {
            return Ok(None);
        };
        self.persist(&next)?;
        self.current.store(Some(Arc::new(next)));
        debug!(path = %self.path.display(), "Database write persisted");
        Ok(Some(out))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = snapshot.to_json_string()?;
        let tmp = temp_path(&self.path);
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "db.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn stringify_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
