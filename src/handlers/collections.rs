//! Generic CRUD over every top-level resource, answered with raw JSON.
//!
//! Missing resources and records answer `404 {}`. Records are matched by
//! stringified id, so `/posts/1` finds `{"id": 1}`.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::snapshot_of;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiError;
use crate::server::not_found_raw;
use crate::store::{list_records, Record, Resource, StoreError};

fn collection_name(req: &HandlerRequest) -> &str {
    req.get_path_param("collection").unwrap_or_default()
}

fn record_id(req: &HandlerRequest) -> &str {
    req.get_path_param("id").unwrap_or_default()
}

fn body_record(req: &HandlerRequest) -> Result<Record, HandlerResponse> {
    req.body
        .json()
        .cloned()
        .and_then(Record::from_value)
        .ok_or_else(|| ApiError::MissingBody.into_response())
}

fn ok(status: u16, record: Record) -> HandlerResponse {
    HandlerResponse::json(status, record.into_value())
}

fn empty_object(status: u16) -> HandlerResponse {
    HandlerResponse::json(status, Value::Object(Map::new()))
}

fn store_failure(err: StoreError) -> HandlerResponse {
    if err.is_not_found() {
        debug!(error = %err, "Resource not found");
        return not_found_raw();
    }
    ApiError::unhandled(err).into_response()
}

/// `GET /{collection}`: filtered listing, or the resource itself when it is
/// not a collection.
pub fn list_collection(req: &HandlerRequest) -> HandlerResponse {
    let snapshot = match snapshot_of(req) {
        Ok(snapshot) => snapshot,
        Err(e) => return ApiError::unhandled(e).into_response(),
    };
    let name = collection_name(req);
    match snapshot.resource(name) {
        None => not_found_raw(),
        Some(Resource::Collection(records)) => {
            match list_records(name, records, &req.query_params) {
                Ok(outcome) => {
                    debug!(
                        collection = %name,
                        total = outcome.total,
                        returned = outcome.items.len(),
                        "Collection listed"
                    );
                    HandlerResponse::json(
                        200,
                        Value::Array(outcome.items.into_iter().map(Record::into_value).collect()),
                    )
                }
                Err(e) => ApiError::unhandled(e).into_response(),
            }
        }
        Some(other) => HandlerResponse::json(200, other.to_value()),
    }
}

/// `GET /{collection}/{id}`
pub fn get_record(req: &HandlerRequest) -> HandlerResponse {
    let snapshot = match snapshot_of(req) {
        Ok(snapshot) => snapshot,
        Err(e) => return ApiError::unhandled(e).into_response(),
    };
    let id = record_id(req);
    match snapshot.collection(collection_name(req)) {
        Ok(records) => records
            .iter()
            .find(|r| r.id_matches(id))
            .map_or_else(not_found_raw, |r| ok(200, r.clone())),
        Err(_) => not_found_raw(),
    }
}

/// `POST /{collection}`: 201 with the stored record.
pub fn create_record(req: &HandlerRequest) -> HandlerResponse {
    let record = match body_record(req) {
        Ok(record) => record,
        Err(res) => return res,
    };
    let name = collection_name(req);
    match req.store.insert(name, record) {
        Ok(stored) => {
            info!(request_id = %req.request_id, collection = %name, id = ?stored.id_value(), "Record created");
            ok(201, stored)
        }
        Err(e) => store_failure(e),
    }
}

/// `PUT /{collection}/{id}`: full replacement keeping the stored id.
pub fn replace_record(req: &HandlerRequest) -> HandlerResponse {
    let record = match body_record(req) {
        Ok(record) => record,
        Err(res) => return res,
    };
    match req.store.replace(collection_name(req), record_id(req), record) {
        Ok(Some(stored)) => ok(200, stored),
        Ok(None) => not_found_raw(),
        Err(e) => store_failure(e),
    }
}

/// `PATCH /{collection}/{id}`: shallow merge keeping the stored id.
pub fn patch_record(req: &HandlerRequest) -> HandlerResponse {
    let patch = match body_record(req) {
        Ok(record) => record,
        Err(res) => return res,
    };
    match req.store.patch(collection_name(req), record_id(req), &patch) {
        Ok(Some(stored)) => ok(200, stored),
        Ok(None) => not_found_raw(),
        Err(e) => store_failure(e),
    }
}

/// `DELETE /{collection}/{id}`: 200 `{}`.
pub fn delete_record(req: &HandlerRequest) -> HandlerResponse {
    let name = collection_name(req);
    let id = record_id(req);
    match req.store.remove(name, id) {
        Ok(Some(_)) => {
            info!(request_id = %req.request_id, collection = %name, id = %id, "Record deleted");
            empty_object(200)
        }
        Ok(None) => not_found_raw(),
        Err(e) => store_failure(e),
    }
}

/// `PUT /{resource}` on a singular resource.
pub fn replace_singular(req: &HandlerRequest) -> HandlerResponse {
    let record = match body_record(req) {
        Ok(record) => record,
        Err(res) => return res,
    };
    match req.store.replace_singular(collection_name(req), record) {
        Ok(stored) => ok(200, stored),
        Err(e) => store_failure(e),
    }
}

/// `PATCH /{resource}` on a singular resource.
pub fn patch_singular(req: &HandlerRequest) -> HandlerResponse {
    let patch = match body_record(req) {
        Ok(record) => record,
        Err(res) => return res,
    };
    match req.store.patch_singular(collection_name(req), &patch) {
        Ok(stored) => ok(200, stored),
        Err(e) => store_failure(e),
    }
}
