//! # Handlers Module
//!
//! Request handlers registered with the dispatcher.
//!
//! - [`shift_daily`]: enveloped listing and lookup for `shift_daily`
//! - [`menu`]: enveloped `find_all_menu` dump
//! - [`collections`]: raw json-server style CRUD for every other resource
//!
//! Every handler has the shape `fn(&HandlerRequest) -> HandlerResponse` and
//! reads only from the snapshot attached to the request; writes go through
//! [`crate::store::DataStore`].

pub mod collections;
pub mod menu;
pub mod shift_daily;

use std::sync::Arc;

use crate::dispatcher::HandlerRequest;
use crate::store::Snapshot;

/// Snapshot of the request or an error naming the gap. The normalizer
/// rejects requests without one, so this only fails for handlers invoked
/// outside the service.
pub(crate) fn snapshot_of(req: &HandlerRequest) -> anyhow::Result<&Arc<Snapshot>> {
    req.snapshot
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("request {} carries no snapshot", req.request_id))
}

#[cfg(test)]
pub(crate) mod test_support {
    use http::Method;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::dispatcher::HandlerRequest;
    use crate::router::ParamVec;
    use crate::store::DataStore;

    /// Store loaded from `db` in a fresh temp dir; keep the dir alive.
    pub fn store_with(db: &Value) -> (TempDir, Arc<DataStore>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, db.to_string()).unwrap();
        let store = Arc::new(DataStore::open(path));
        assert!(store.is_available());
        (dir, store)
    }

    pub fn request(
        store: &Arc<DataStore>,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> HandlerRequest {
        let mut req = HandlerRequest::new(method, path, Arc::clone(store));
        req.path_params = params
            .iter()
            .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
            .collect::<ParamVec>();
        req
    }
}
