//! # Hot Reload Module
//!
//! Reloads the datastore when its backing file changes on disk.
//!
//! The watcher observes the file's parent directory rather than the file
//! itself: editors and the store's own writes replace the file by rename,
//! which would orphan a watch on the old inode. Events are filtered down to
//! the database file name, and only create/modify events trigger a reload.
//!
//! A reload that fails to read or parse keeps the previous snapshot active
//! and logs the error; the server keeps serving.
//!
//! ```rust,ignore
//! use shiftdesk::hot_reload::watch_database;
//!
//! let store = Arc::new(DataStore::open("db.json"));
//! let _watcher = watch_database(Arc::clone(&store), |snapshot| {
//!     println!("reloaded {} resources", snapshot.names().count());
//! })?;
//! ```

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::store::{DataStore, Snapshot};

/// Watch the store's backing file and reload it on every change.
///
/// `on_reload` runs after each successful reload with the new snapshot. The
/// returned watcher must be kept alive for watching to continue.
///
/// # Errors
///
/// Returns the `notify` error if the watcher cannot be created or the
/// directory cannot be watched.
pub fn watch_database<F>(store: Arc<DataStore>, mut on_reload: F) -> notify::Result<RecommendedWatcher>
where
    F: FnMut(&Snapshot) + Send + 'static,
{
    let db_path = store.path().to_path_buf();
    let file_name = db_path.file_name().map(OsString::from);
    let watch_dir = watch_dir_for(&db_path);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let touches_db = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(OsString::from) == file_name);
                if !touches_db {
                    return;
                }
                debug!(kind = ?event.kind, "Database file changed");
                match store.load() {
                    Ok(snapshot) => {
                        info!(path = %store.path().display(), "Database reloaded");
                        on_reload(&snapshot);
                    }
                    Err(e) => {
                        error!(path = %store.path().display(), error = %e, "Error reloading database");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Database watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
    info!(dir = %watch_dir.display(), "Watching database for changes");
    Ok(watcher)
}

fn watch_dir_for(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
