//! # shiftdesk
//!
//! A REST API over a single flat JSON file, served on the `may` coroutine
//! runtime with `may_minihttp`.
//!
//! Every top-level key of the file is a resource with generated CRUD routes
//! (json-server style). Two resources get dedicated, enveloped endpoints:
//!
//! - `GET /shift_daily`: filtering, search, sorting and pagination
//! - `GET /shift_daily/{id}`: single record lookup
//! - `GET /find_all_menu`: the whole menu resource
//!
//! ## Architecture
//!
//! - **[`store`]**: file-backed datastore with atomically swapped snapshots
//! - **[`hot_reload`]**: reloads the store when the file changes
//! - **[`middleware`]**: CORS, request logging and the request normalizer
//! - **[`router`]**: ordered path-pattern matching
//! - **[`dispatcher`]**: handler coroutines fed by channels
//! - **[`handlers`]**: shift, menu and generic collection handlers
//! - **[`shift`]**: the `shift_daily` query engine
//! - **[`server`]**: HTTP service and server handle
//!
//! ## Request Flow
//!
//! ```text
//! request ─► parse ─► snapshot ─► middleware.before ─► router ─► dispatcher ─► handler
//!                                        │                                        │
//!                                        └──────── early response                 │
//!                                                       ▼                         ▼
//!                                               middleware.after ◄───────── response
//! ```
//!
//! ## Response Shapes
//!
//! Dedicated endpoints and every guard use the envelope
//! `{ "code": 200, "message": "success", "data": ... }`. The generic
//! collection routes answer raw JSON, with `404 {}` for anything missing.

pub mod cli;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod hot_reload;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod shift;
pub mod store;

pub use envelope::Envelope;
pub use error::ApiError;
pub use store::{DataStore, Record, Snapshot, StoreError};
