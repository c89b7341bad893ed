//! Shared plumbing for commands: config path, logging, engine, acting user.

use super::config::{default_config_path, CongressConfig, LoggingConfig};
use legislature::congress::{Actor, Congress, UserId};
use legislature::store::SqliteStore;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// `--config` if given, otherwise the default location
pub fn config_path(config: Option<&str>) -> PathBuf {
    config.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| format!("Invalid log level '{}': {}", logging.level, e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create log directory: {}", e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
            registry
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()?;
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

/// Open the configured database and build an engine over it.
pub async fn open_engine(
    config: &CongressConfig,
) -> Result<Congress<SqliteStore>, Box<dyn std::error::Error>> {
    let store = SqliteStore::open(&config.database_path()).await?;
    Ok(Congress::new(Arc::new(store), config.governance.clone()))
}

pub fn require_user(as_user: Option<u64>) -> Result<UserId, Box<dyn std::error::Error>> {
    as_user
        .map(UserId)
        .ok_or_else(|| "This command needs --as <USER>".into())
}

/// Resolve `--as` into an acting context.
pub async fn acting(
    engine: &Congress<SqliteStore>,
    as_user: Option<u64>,
) -> Result<Actor, Box<dyn std::error::Error>> {
    let user = require_user(as_user)?;
    Ok(engine.actor(user).await?)
}
