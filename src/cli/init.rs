use super::config::{default_database_path, CongressConfig};
use legislature::store::SqliteStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Create the config file (unless present) and the database schema
///
/// An existing config file is kept unless `force` is set. With `force`, a
/// readable config keeps its governance and logging settings and only gets
/// the new database path; an unreadable one is replaced by the defaults.
/// The database the config names is opened either way so the schema exists
/// afterwards.
pub async fn execute(
    config_path: &Path,
    database: Option<String>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database = database
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path);

    if !config_path.exists() {
        CongressConfig::create_default(config_path, &database)?;
        println!("Config: {} (created)", config_path.display());
    } else if !force {
        println!("Config: {} (existing)", config_path.display());
    } else {
        match CongressConfig::load(config_path) {
            Ok(mut config) => {
                config.storage.database = database;
                config.save(config_path)?;
                println!("Config: {} (rewritten)", config_path.display());
            }
            Err(e) => {
                warn!(error = %e, "existing config unreadable, writing defaults");
                CongressConfig::create_default(config_path, &database)?;
                println!("Config: {} (replaced)", config_path.display());
            }
        }
    }

    let config = CongressConfig::load(config_path)?;
    let database = config.database_path();
    SqliteStore::open(&database).await?;
    info!(database = %database.display(), "database ready");

    println!("Database: {}", database.display());
    Ok(())
}
