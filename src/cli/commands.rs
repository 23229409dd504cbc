use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::hot_reload::watch_database;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};
use crate::store::{DataStore, Resource, Snapshot};

/// Command-line interface for shiftdesk
#[derive(Parser)]
#[command(name = "shiftdesk", version)]
#[command(about = "Flat-file JSON REST API with shift scheduling queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the REST API over a JSON file
    Serve {
        /// Backing JSON file
        #[arg(long, env = "SHIFTDESK_DB", default_value = "db.json")]
        db: PathBuf,

        /// Address to bind
        #[arg(long, env = "SHIFTDESK_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 4000)]
        port: u16,

        /// Do not reload the database when the file changes
        #[arg(long, default_value_t = false)]
        no_watch: bool,
    },
    /// Parse the database file and summarize its resources
    Check {
        /// Backing JSON file
        #[arg(long, env = "SHIFTDESK_DB", default_value = "db.json")]
        db: PathBuf,
    },
}

/// One `name: summary` line per resource, in file order.
#[must_use]
pub fn describe_snapshot(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .names()
        .filter_map(|name| {
            let summary = match snapshot.resource(name)? {
                Resource::Collection(records) => format!("{} records", records.len()),
                Resource::Singular(record) => format!("object with {} fields", record.fields().count()),
                Resource::Other(_) => "plain value".to_string(),
            };
            Some(format!("{name}: {summary}"))
        })
        .collect()
}

/// Execute a parsed command.
///
/// # Errors
///
/// `serve` fails if the route table does not compile, the watcher cannot
/// start, or the port cannot be bound. `check` fails if the file cannot be
/// read or parsed.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            db,
            host,
            port,
            no_watch,
        } => {
            let runtime = RuntimeConfig::from_env();
            may::config().set_stack_size(runtime.stack_size);

            let store = Arc::new(DataStore::open(db));
            let _watcher = if no_watch {
                None
            } else {
                let watcher = watch_database(Arc::clone(&store), |snapshot| {
                    info!(resources = snapshot.names().count(), "Snapshot swapped");
                })
                .context("failed to watch database file")?;
                Some(watcher)
            };

            let service = AppService::with_defaults(store).context("invalid route table")?;
            let handle = HttpServer(service)
                .start((host.as_str(), port))
                .with_context(|| format!("failed to bind {host}:{port}"))?;
            info!(addr = %handle.addr(), "JSON Server is running on port {port}");
            handle
                .join()
                .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))
        }
        Commands::Check { db } => {
            let store = DataStore::new(&db);
            let snapshot = store
                .load()
                .with_context(|| format!("failed to load {}", db.display()))?;
            for line in describe_snapshot(&snapshot) {
                println!("{line}");
            }
            Ok(())
        }
    }
}
