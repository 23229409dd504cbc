//! # Server Module
//!
//! HTTP front end on `may_minihttp`.
//!
//! [`AppService`] is the per-connection service: it parses the request,
//! takes one datastore snapshot, runs the middleware chain, routes and
//! dispatches, and writes the response. [`HttpServer`] binds it to a socket
//! and returns a [`ServerHandle`] for readiness checks and shutdown.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_body, parse_query_params, parse_request, ParsedRequest, QueryVec};
pub use response::{not_found_raw, write_handler_response};
pub use service::AppService;
