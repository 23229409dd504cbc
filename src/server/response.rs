use may_minihttp::Response;
use serde_json::Value;
use tracing::error;

use crate::dispatcher::HandlerResponse;

pub const JSON_CONTENT_TYPE: &str = "Content-Type: application/json; charset=utf-8";
pub const NO_CACHE: &str = "Cache-Control: no-cache";

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Serialize `response` onto the wire.
///
/// Every response carries `Cache-Control: no-cache`. A `Value::Null` body is
/// sent with no content.
pub fn write_handler_response(res: &mut Response, response: &HandlerResponse) {
    res.status_code(response.status as usize, status_reason(response.status));
    res.header(NO_CACHE);
    for &line in &response.headers {
        res.header(line);
    }
    if response.body.is_null() {
        return;
    }
    res.header(JSON_CONTENT_TYPE);
    match serde_json::to_vec(&response.body) {
        Ok(bytes) => res.body_vec(bytes),
        Err(e) => {
            error!(error = %e, "Response serialization failed");
            res.body_vec(b"{}".to_vec());
        }
    }
}

/// Raw json-server style `404 {}`.
#[must_use]
pub fn not_found_raw() -> HandlerResponse {
    HandlerResponse::json(404, Value::Object(serde_json::Map::new()))
}
