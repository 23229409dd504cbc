use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatcher::{HeaderVec, RequestBody};

/// Query string pairs in arrival order; repeated keys are kept.
pub type QueryVec = Vec<(String, String)>;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method as sent (GET, POST, etc.)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    pub query_params: QueryVec,
    pub body: RequestBody,
}

/// Parse query string parameters from a URL path
///
/// Everything after the first `?` is form-urlencoded decoded. Order and
/// duplicates are preserved (`?id=1&id=2` yields two pairs).
#[must_use]
pub fn parse_query_params(path: &str) -> QueryVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => QueryVec::new(),
    }
}

/// Classify raw body bytes.
///
/// Bodies are parsed as JSON when the content type is absent or mentions
/// `json`; any other content type is treated as no body. Whitespace-only
/// bodies count as empty.
#[must_use]
pub fn parse_body(raw: &[u8], content_type: Option<&str>) -> RequestBody {
    let text = String::from_utf8_lossy(raw);
    if text.trim().is_empty() {
        return RequestBody::Empty;
    }
    if content_type.is_some_and(|ct| !ct.to_ascii_lowercase().contains("json")) {
        debug!(content_type = ?content_type, "Ignoring non-JSON request body");
        return RequestBody::Empty;
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => RequestBody::Json(json),
        Err(e) => {
            debug!(error = %e, body_size_bytes = raw.len(), "JSON body parse failed");
            RequestBody::Malformed(text.into_owned())
        }
    }
}

/// Extract method, path, headers, query and body from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::<str>::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();
    debug!(header_count = headers.len(), "Headers extracted");

    let query_params = parse_query_params(&raw_path);

    let mut raw_body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut raw_body) {
        warn!(error = %e, path = %path, "Failed to read request body");
    }
    let content_type = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "content-type")
        .map(|(_, v)| v.as_str());
    let body = parse_body(&raw_body, content_type);

    debug!(
        method = %method,
        path = %path,
        param_count = query_params.len(),
        body_size_bytes = raw_body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
    }
}
