//! Congress configuration file handling
//!
//! Provides default configuration generation and loading for the `congress`
//! binary. Configuration files are TOML and live next to the database by
//! default (`~/.local/share/congress/`).

use legislature::congress::GovernanceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Database file name inside the data directory
const DEFAULT_DATABASE_FILE: &str = "congress.db";

/// Operator configuration for the `congress` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CongressConfig {
    /// Cooldown and currency rules handed to the engine
    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Database location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file; a leading `~/` expands to the home directory
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl CongressConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: CongressConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Database path with `~/` expanded
    pub fn database_path(&self) -> PathBuf {
        expand_home(&self.storage.database)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(database: &Path) -> String {
        format!(
            r#"# Congress Configuration
#
# Deployment settings for the congress operator binary. Laws themselves
# (taxes, relations, transfers) are decided by congress votes and are not
# configurable here.

[governance]
# Minimum time between two proposals by the same member (humantime syntax)
proposal_cooldown = "2days"

# Currencies accepted in fund-transfer proposals
currencies = ["gold", "local"]

[storage]
# SQLite database holding proposals, votes and body state
database = "{database}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/congress/congress.log"
"#,
            database = database.display()
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        database: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(database);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Data directory for config and database
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("congress")
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Get the default database path
pub fn default_database_path() -> PathBuf {
    default_data_dir().join(DEFAULT_DATABASE_FILE)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CongressConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.governance.proposal_cooldown,
            Duration::from_secs(172_800)
        );
        assert!(config.storage.database.ends_with("congress/congress.db"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = CongressConfig::default();
        config.storage.database = temp_dir.path().join("test.db");
        config.governance.currencies = vec!["gold".to_string()];
        config.save(&config_path).unwrap();

        let loaded = CongressConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_create_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let database = temp_dir.path().join("congress.db");

        CongressConfig::create_default(&config_path, &database).unwrap();
        assert!(config_path.exists());

        let config = CongressConfig::load(&config_path).unwrap();
        assert_eq!(config.storage.database, database);
        assert_eq!(config.governance, GovernanceConfig::default());
    }

    #[test]
    fn test_generate_default_toml() {
        let toml = CongressConfig::generate_default_toml(Path::new("/srv/congress.db"));

        assert!(toml.contains("database = \"/srv/congress.db\""));
        assert!(toml.contains("proposal_cooldown = \"2days\""));
        assert!(toml.contains("currencies = [\"gold\", \"local\"]"));
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let minimal_config = r#"
[governance]
proposal_cooldown = "36h"
"#;
        fs::write(&config_path, minimal_config).unwrap();

        let config = CongressConfig::load(&config_path).unwrap();
        assert_eq!(
            config.governance.proposal_cooldown,
            Duration::from_secs(36 * 3600)
        );
        assert_eq!(config.governance.currencies, vec!["gold", "local"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            CongressConfig::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CongressConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_duration() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[governance]\nproposal_cooldown = \"soon\"\n").unwrap();

        assert!(CongressConfig::load(&config_path).is_err());
    }

    #[test]
    fn test_home_expansion() {
        let mut config = CongressConfig::default();
        config.storage.database = PathBuf::from("~/congress.db");
        let expanded = config.database_path();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("congress.db"));
        }

        config.storage.database = PathBuf::from("/abs/congress.db");
        assert_eq!(config.database_path(), PathBuf::from("/abs/congress.db"));
    }
}
