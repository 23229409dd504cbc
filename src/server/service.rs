use http::Method;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::request::{parse_request, ParsedRequest};
use super::response::{not_found_raw, write_handler_response};
use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::middleware::{self, Middleware};
use crate::registry;
use crate::router::Router;
use crate::store::DataStore;

/// `may_minihttp` service tying together the store, middleware chain,
/// router and dispatcher.
///
/// Cloned once per connection by the server; all state is shared behind
/// `Arc`s.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<DataStore>,
    pub middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl AppService {
    #[must_use]
    pub fn new(
        router: Router,
        dispatcher: Dispatcher,
        store: Arc<DataStore>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
            store,
            middlewares: Arc::new(middlewares),
        }
    }

    /// Full route table, one handler coroutine per route and the default
    /// middleware chain.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a route pattern fails to compile.
    pub fn with_defaults(store: Arc<DataStore>) -> Result<Self, regex::Error> {
        let router = registry::build_router()?;
        let mut dispatcher = Dispatcher::new();
        // SAFETY: register_all only spawns coroutines on the global may
        // scheduler, which initializes itself on first use; every handler is
        // a plain fn pointer.
        unsafe {
            registry::register_all(&mut dispatcher);
        }
        Ok(Self::new(router, dispatcher, store, middleware::default_chain()))
    }

    /// Run one parsed request through middleware, routing and dispatch.
    #[must_use]
    pub fn handle(&self, parsed: ParsedRequest) -> HandlerResponse {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
        } = parsed;

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            warn!(method = %method, path = %path, "Unparseable HTTP method");
            return not_found_raw();
        };

        let mut request = HandlerRequest {
            request_id: RequestId::new(),
            method,
            path,
            handler_name: String::new(),
            path_params: Default::default(),
            query_params,
            headers,
            body,
            snapshot: self.store.snapshot(),
            store: Arc::clone(&self.store),
        };
        request.request_id = RequestId::from_header_or_new(request.get_header("x-request-id"));

        let start = Instant::now();
        let early = self.middlewares.iter().enumerate().find_map(|(idx, mw)| {
            let resp = mw.before(&mut request)?;
            debug!(
                request_id = %request.request_id,
                middleware_idx = idx,
                status = resp.status,
                "Middleware returned early response"
            );
            Some(resp)
        });

        let mut response = match early {
            Some(resp) => resp,
            None => self.route_and_dispatch(&mut request),
        };

        let latency = start.elapsed();
        for mw in self.middlewares.iter() {
            mw.after(&request, &mut response, latency);
        }
        response
    }

    fn route_and_dispatch(&self, request: &mut HandlerRequest) -> HandlerResponse {
        // HEAD is served as GET with the body dropped
        let is_head = request.method == Method::HEAD;
        let lookup = if is_head { Method::GET } else { request.method.clone() };

        let Some(route_match) = self.router.route(&lookup, &request.path) else {
            return not_found_raw();
        };
        request.set_route(route_match);

        let mut response = self
            .dispatcher
            .dispatch(request.clone())
            .unwrap_or_else(not_found_raw);
        if is_head {
            response.body = serde_json::Value::Null;
        }
        response
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let response = self.handle(parse_request(req));
        write_handler_response(res, &response);
        Ok(())
    }
}
