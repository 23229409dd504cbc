//! # Middleware Module
//!
//! Request/response hooks applied by `AppService` around routing and
//! dispatch. The default chain, in order:
//!
//! - [`TracingMiddleware`]: one structured log line per request
//! - [`CorsMiddleware`]: permissive CORS headers and `OPTIONS` preflight
//! - [`RequestNormalizer`]: availability guard, body checks, id and
//!   timestamp injection for writes

mod core;
mod cors;
mod normalizer;
mod tracing;

pub use core::Middleware;
pub use cors::CorsMiddleware;
pub use normalizer::RequestNormalizer;
pub use tracing::TracingMiddleware;

use std::sync::Arc;

/// The middleware chain installed by the `serve` command.
#[must_use]
pub fn default_chain() -> Vec<Arc<dyn Middleware>> {
    vec![
        Arc::new(TracingMiddleware),
        Arc::new(CorsMiddleware::default()),
        Arc::new(RequestNormalizer),
    ]
}
