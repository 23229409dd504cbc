use http::Method;
use serde_json::Value;
use tracing::debug;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse, RequestBody};
use crate::error::ApiError;
use crate::ids::new_record_id;
use crate::store::schema::{CREATED_AT_FIELD, ID_FIELD, SHIFT_DAILY};
use crate::store::values::now_timestamp;

/// Guards and rewrites every request before routing.
///
/// 1. A body that failed to parse as JSON is answered with the catch-all 500.
/// 2. While the database has never loaded, every request gets the
///    unavailable 500.
/// 3. `POST`, `PUT` and `PATCH` need a non-empty JSON object body, else 400.
/// 4. `POST` bodies get a fresh `id` and the current `created_at`,
///    replacing whatever the client sent.
/// 5. `PUT` bodies whose `id` names an existing `shift_daily` record get
///    that record's `created_at` back.
pub struct RequestNormalizer;

impl Middleware for RequestNormalizer {
    fn before(&self, req: &mut HandlerRequest) -> Option<HandlerResponse> {
        if let RequestBody::Malformed(raw) = &req.body {
            let err = anyhow::anyhow!("malformed JSON body ({} bytes)", raw.len());
            return Some(ApiError::unhandled(err).into_response());
        }

        let Some(snapshot) = req.snapshot.clone() else {
            return Some(ApiError::Unavailable.into_response());
        };

        if !matches!(req.method, Method::POST | Method::PUT | Method::PATCH) {
            return None;
        }

        let Some(Value::Object(body)) = req.body.json_mut() else {
            return Some(ApiError::MissingBody.into_response());
        };
        if body.is_empty() {
            return Some(ApiError::MissingBody.into_response());
        }

        if req.method == Method::POST {
            let id = new_record_id();
            debug!(request_id = %req.request_id, record_id = %id, "Assigned record id");
            body.insert(ID_FIELD.to_string(), Value::String(id));
            body.insert(CREATED_AT_FIELD.to_string(), Value::String(now_timestamp()));
        } else if req.method == Method::PUT {
            let existing = body
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .and_then(|id| snapshot.find_by_id(SHIFT_DAILY, id))
                .and_then(|record| record.get(CREATED_AT_FIELD))
                .filter(|value| is_truthy(value))
                .cloned();
            if let Some(created_at) = existing {
                debug!(request_id = %req.request_id, created_at = %created_at, "Restored created_at");
                body.insert(CREATED_AT_FIELD.to_string(), created_at);
            }
        }

        None
    }
}

/// `null`, `false`, `0` and `""` do not count as a stored value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
