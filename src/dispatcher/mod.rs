//! # Dispatcher Module
//!
//! Coroutine-based request handler dispatch.
//!
//! Each named handler runs in its own `may` coroutine fed by an MPSC
//! channel. The service routes a request, hands it to the dispatcher, and
//! blocks (cooperatively) on a one-shot reply channel until the handler
//! answers.
//!
//! ## Request Flow
//!
//! 1. `AppService` parses the request and takes one datastore snapshot
//! 2. The middleware chain runs its `before` hooks
//! 3. The router picks a handler name
//! 4. The dispatcher sends the request to that handler's coroutine
//! 5. The response comes back, passes the `after` hooks and is written
//!
//! ## Error Handling
//!
//! - Handler panics are caught and answered with the catch-all 500 envelope
//! - A closed handler channel is answered the same way
//! - Coroutine stack size comes from `SHIFTDESK_STACK_SIZE`

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, RequestBody,
    ResponseHeaders, MAX_INLINE_HEADERS,
};
