//! Dispatcher core module - hands routed requests to handler coroutines.

use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};
use crate::runtime_config::RuntimeConfig;
use crate::server::QueryVec;
use crate::store::{DataStore, Snapshot};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated request header storage, names lowercased
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response headers are written verbatim (`"Name: value"`) by `may_minihttp`,
/// which only accepts `'static` lines.
pub type ResponseHeaders = SmallVec<[&'static str; 4]>;

/// Request body as received on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No bytes were sent
    Empty,
    /// Bytes that did not parse as JSON
    Malformed(String),
    Json(Value),
}

impl RequestBody {
    /// The parsed JSON value, if any.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn json_mut(&mut self) -> Option<&mut Value> {
        match self {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Request data passed through the middleware chain and into a handler.
///
/// `handler_name` and `path_params` are filled in once routing succeeds;
/// middleware `before` hooks run earlier and see them empty.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    /// Query string pairs in arrival order, repeated keys kept
    pub query_params: QueryVec,
    pub headers: HeaderVec,
    pub body: RequestBody,
    /// Snapshot taken once for this request; `None` while the database has
    /// never loaded
    pub snapshot: Option<Arc<Snapshot>>,
    pub store: Arc<DataStore>,
}

impl HandlerRequest {
    /// Bare request for `method` + `path` with the store's current snapshot.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, store: Arc<DataStore>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            handler_name: String::new(),
            path_params: ParamVec::new(),
            query_params: QueryVec::new(),
            headers: HeaderVec::new(),
            body: RequestBody::Empty,
            snapshot: store.snapshot(),
            store,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query_params: QueryVec) -> Self {
        self.query_params = query_params;
        self
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Attach routing results.
    pub fn set_route(&mut self, route_match: RouteMatch) {
        self.handler_name = route_match.handler_name;
        self.path_params = route_match.path_params;
    }
}

/// Response produced by a handler or short-circuiting middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    /// Extra header lines; `Content-Type` is added by the writer
    pub headers: ResponseHeaders,
    /// `Value::Null` means no body
    pub body: Value,
}

impl HandlerResponse {
    /// Create a JSON response
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: ResponseHeaders::new(),
            body,
        }
    }

    /// Bodyless response with `status` (e.g. 204 for preflight).
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::json(status, Value::Null)
    }

    /// Builder-style variant of [`HandlerResponse::add_header`].
    #[must_use]
    pub fn with_header(mut self, line: &'static str) -> Self {
        self.add_header(line);
        self
    }

    /// Add a raw header line, replacing one with the same name.
    pub fn add_header(&mut self, line: &'static str) {
        let name = header_name(line);
        self.headers
            .retain(|existing| !header_name(existing).eq_ignore_ascii_case(name));
        self.headers.push(line);
    }

    /// Value of a header line by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .copied()
            .find(|line| header_name(line).eq_ignore_ascii_case(name))
            .map(|line| line.split_once(':').map_or("", |(_, v)| v.trim()))
    }
}

fn header_name(line: &str) -> &str {
    line.split_once(':').map_or(line, |(n, _)| n.trim())
}

/// Work item sent to a handler coroutine
struct Job {
    request: HandlerRequest,
    reply_tx: mpsc::Sender<HandlerResponse>,
}

/// Channel sender feeding one handler coroutine
pub struct HandlerSender(mpsc::Sender<Job>);

impl Clone for HandlerSender {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Dispatcher that routes requests to registered handler coroutines
///
/// Maintains a registry of handler names to their corresponding channel senders.
#[derive(Clone)]
pub struct Dispatcher {
    pub handlers: HashMap<String, HandlerSender>,
    stack_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create an empty dispatcher sized from [`RuntimeConfig::from_env`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_runtime_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_runtime_config(config: RuntimeConfig) -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            stack_size: config.stack_size,
        }
    }

    /// Registers a handler function that will process incoming requests with the given name.
    ///
    /// Spawns a coroutine that processes requests from a channel. A panic
    /// inside the handler is caught and answered with the catch-all 500
    /// envelope; the coroutine keeps serving.
    ///
    /// If a handler with the same name already exists, it is replaced and the
    /// old coroutine exits once its channel closes.
    ///
    /// # Safety
    ///
    /// This function is marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure the May
    /// coroutine runtime is properly initialized before calling this.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job>();
        let handler_name_for_logging = name.to_string();
        let stack_size = self.stack_size;

        // SAFETY: spawn() is unsafe per the may runtime contract. The closure
        // owns everything it touches (Send + 'static) and never unwinds past
        // catch_unwind.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(name.to_string())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %handler_name_for_logging,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );

                    for Job { request, reply_tx } in rx.iter() {
                        let request_id = request.request_id;
                        let execution_start = Instant::now();

                        let response = match std::panic::catch_unwind(
                            std::panic::AssertUnwindSafe(|| handler_fn(&request)),
                        ) {
                            Ok(response) => {
                                debug!(
                                    request_id = %request_id,
                                    handler_name = %request.handler_name,
                                    execution_time_ms = execution_start.elapsed().as_millis() as u64,
                                    "Handler execution complete"
                                );
                                response
                            }
                            Err(panic) => {
                                let panic_message = panic
                                    .downcast_ref::<&str>()
                                    .map(|s| (*s).to_string())
                                    .or_else(|| panic.downcast_ref::<String>().cloned())
                                    .unwrap_or_else(|| "non-string panic payload".to_string());
                                error!(
                                    request_id = %request_id,
                                    handler_name = %request.handler_name,
                                    panic_message = %panic_message,
                                    "Handler panicked - CRITICAL"
                                );
                                ApiError::unhandled(anyhow::anyhow!(
                                    "handler '{}' panicked: {panic_message}",
                                    request.handler_name
                                ))
                                .into_response()
                            }
                        };

                        if reply_tx.send(response).is_err() {
                            warn!(request_id = %request_id, "Reply channel closed before response");
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine - CRITICAL"
            );
            return;
        }

        if self.handlers.insert(name.to_string(), HandlerSender(tx)).is_some() {
            warn!(handler_name = %name, "Replaced existing handler - old coroutine will exit");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered successfully"
        );
    }

    /// Send `request` to its handler and wait for the reply.
    ///
    /// Returns `None` when no handler is registered under
    /// `request.handler_name`. A handler whose channel is gone yields the
    /// catch-all 500.
    #[must_use]
    pub fn dispatch(&self, request: HandlerRequest) -> Option<HandlerResponse> {
        let Some(HandlerSender(tx)) = self.handlers.get(&request.handler_name) else {
            let available_handlers: Vec<&String> = self.handlers.keys().collect();
            error!(
                handler_name = %request.handler_name,
                available_handlers = ?available_handlers,
                "Handler not found - CRITICAL"
            );
            return None;
        };

        let request_id = request.request_id;
        let handler_name = request.handler_name.clone();
        let (reply_tx, reply_rx) = mpsc::channel();
        let start = Instant::now();

        debug!(
            request_id = %request_id,
            handler_name = %handler_name,
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );

        if let Err(e) = tx.send(Job { request, reply_tx }) {
            error!(
                request_id = %request_id,
                handler_name = %handler_name,
                error = %e,
                "Failed to send request to handler"
            );
            return Some(
                ApiError::unhandled(anyhow::anyhow!("handler '{handler_name}' is not running"))
                    .into_response(),
            );
        }

        match reply_rx.recv() {
            Ok(response) => {
                debug!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    status = response.status,
                    "Handler response received"
                );
                Some(response)
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    error = %e,
                    "Handler channel closed - handler may have crashed"
                );
                Some(
                    ApiError::unhandled(anyhow::anyhow!(
                        "handler '{handler_name}' dropped the reply channel"
                    ))
                    .into_response(),
                )
            }
        }
    }
}
