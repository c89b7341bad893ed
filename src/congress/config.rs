//! Governance rules that are deployment settings rather than law.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum time between two proposals by the same proposer.
pub const DEFAULT_PROPOSAL_COOLDOWN: Duration = Duration::from_secs(2 * 24 * 3600);

/// Currencies accepted in fund transfers unless configured otherwise.
pub const DEFAULT_CURRENCIES: &[&str] = &["gold", "local"];

/// Library-side governance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Anti-spam window, measured from the proposer's latest proposal.
    #[serde(with = "humantime_serde_compat", default = "default_cooldown")]
    pub proposal_cooldown: Duration,

    /// Fixed set of currency identifiers (lowercase).
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
}

fn default_cooldown() -> Duration {
    DEFAULT_PROPOSAL_COOLDOWN
}

fn default_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            proposal_cooldown: default_cooldown(),
            currencies: default_currencies(),
        }
    }
}

impl GovernanceConfig {
    pub fn accepts_currency(&self, currency: &str) -> bool {
        self.currencies.iter().any(|c| c.eq_ignore_ascii_case(currency))
    }
}

/// Durations as humantime strings ("2days", "36h").
mod humantime_serde_compat {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cooldown_is_two_days() {
        let config = GovernanceConfig::default();
        assert_eq!(config.proposal_cooldown, Duration::from_secs(172_800));
        assert!(config.accepts_currency("gold"));
        assert!(config.accepts_currency("GOLD"));
        assert!(!config.accepts_currency("silver"));
    }

    #[test]
    fn test_parse_from_toml() {
        let config: GovernanceConfig = toml::from_str(
            r#"
            proposal_cooldown = "36h"
            currencies = ["gold"]
            "#,
        )
        .unwrap();
        assert_eq!(config.proposal_cooldown, Duration::from_secs(36 * 3600));
        assert_eq!(config.currencies, vec!["gold".to_string()]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: GovernanceConfig = toml::from_str("").unwrap();
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let result: Result<GovernanceConfig, _> = toml::from_str(r#"proposal_cooldown = "soon""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cooldown_serializes_human_readable() {
        let text = toml::to_string(&GovernanceConfig::default()).unwrap();
        assert!(text.contains("proposal_cooldown = \"2days\""));
    }
}
