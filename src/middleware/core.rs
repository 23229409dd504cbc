use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook pair run around every request.
///
/// `before` hooks run in registration order ahead of routing and may rewrite
/// the request; the first one returning a response short-circuits the rest
/// of the chain and the handler. `after` hooks always run, on whichever
/// response was produced.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &mut HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
