//! # CLI Module
//!
//! Command-line entry points for the `shiftdesk` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! shiftdesk serve --db db.json --port 4000
//! ```
//!
//! - `--db <FILE>`: backing JSON file (`SHIFTDESK_DB`, default `db.json`)
//! - `--host <HOST>`: bind address (`SHIFTDESK_HOST`, default `0.0.0.0`)
//! - `--port <PORT>`: listen port (`PORT`, default `4000`)
//! - `--no-watch`: do not reload the file when it changes
//!
//! A missing or invalid file does not stop the server; every request is
//! answered with the unavailable envelope until a valid file appears.
//!
//! ### `check`
//!
//! ```bash
//! shiftdesk check --db db.json
//! ```
//!
//! Parses the file and prints one line per resource. Exits non-zero when
//! the file cannot be read or parsed.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{describe_snapshot, run_cli, Cli, Commands};
