//! Tests for the dispatcher and its handler coroutines
//!
//! # Test Coverage
//!
//! - Dispatch to a registered handler and reply collection
//! - Unknown handler names
//! - Panic recovery: the catch-all envelope is returned and the handler
//!   coroutine keeps serving later requests

use http::Method;
use serde_json::json;
use shiftdesk::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use shiftdesk::error::UNHANDLED_MESSAGE;
use shiftdesk::runtime_config::RuntimeConfig;
use shiftdesk::store::DataStore;
use std::sync::Arc;

mod common;
use common::test_server::setup_may_runtime;

fn request(handler_name: &str) -> HandlerRequest {
    let store = Arc::new(DataStore::new("unused.json"));
    let mut req = HandlerRequest::new(Method::GET, format!("/{handler_name}"), store);
    req.handler_name = handler_name.to_string();
    req
}

fn dispatcher() -> Dispatcher {
    setup_may_runtime();
    Dispatcher::with_runtime_config(RuntimeConfig::default())
}

fn echo_path(req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(200, json!({ "path": req.path }))
}

fn always_panics(_req: &HandlerRequest) -> HandlerResponse {
    panic!("boom");
}

#[test]
fn test_dispatch_to_registered_handler() {
    let mut dispatcher = dispatcher();
    unsafe {
        dispatcher.register_handler("echo", echo_path);
    }

    let res = dispatcher.dispatch(request("echo")).unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({ "path": "/echo" }));
}

#[test]
fn test_unknown_handler_is_none() {
    let dispatcher = dispatcher();
    assert!(dispatcher.dispatch(request("missing")).is_none());
}

#[test]
fn test_panic_handler_returns_500_and_keeps_serving() {
    let mut dispatcher = dispatcher();
    unsafe {
        dispatcher.register_handler("boom", always_panics);
    }

    for _ in 0..2 {
        let res = dispatcher.dispatch(request("boom")).unwrap();
        assert_eq!(res.status, 500);
        assert_eq!(
            res.body,
            json!({ "code": 500, "message": UNHANDLED_MESSAGE, "data": null })
        );
    }
}
