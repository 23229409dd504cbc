use http::Method;
use std::time::Duration;
use tracing::debug;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

pub const ALLOW_ORIGIN_ANY: &str = "Access-Control-Allow-Origin: *";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods: GET,HEAD,PUT,PATCH,POST,DELETE";
pub const ALLOW_HEADERS: &str =
    "Access-Control-Allow-Headers: Content-Type, Authorization, X-Request-Id";

/// Permissive CORS: every response allows any origin, and `OPTIONS`
/// preflights are answered with 204 before routing.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    allow_origin: &'static str,
    allow_methods: &'static str,
    allow_headers: &'static str,
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allow_origin: ALLOW_ORIGIN_ANY,
            allow_methods: ALLOW_METHODS,
            allow_headers: ALLOW_HEADERS,
        }
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &mut HandlerRequest) -> Option<HandlerResponse> {
        if req.method != Method::OPTIONS {
            return None;
        }
        debug!(request_id = %req.request_id, path = %req.path, "CORS preflight");
        Some(
            HandlerResponse::empty(204)
                .with_header(self.allow_methods)
                .with_header(self.allow_headers),
        )
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        res.add_header(self.allow_origin);
    }
}
