//! Sync configuration

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use core_kernel::{TemporalError, Timezone};

/// Prefix of the environment variables read by [`SyncConfig::from_env`]
pub const ENV_PREFIX: &str = "CRM_SYNC";

/// Bridge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// IANA name of the timezone the CRM expects wall-clock values in
    pub display_timezone: String,
    /// Abort schema builds on untranslatable fields instead of skipping them
    pub strict_schema: bool,
    /// Log level
    pub log_level: String,
    /// JSON file standing in for the CRM API
    pub fixture_path: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            display_timezone: "UTC".to_string(),
            strict_schema: false,
            log_level: "info".to_string(),
            fixture_path: None,
        }
    }
}

impl SyncConfig {
    /// Loads configuration from `CRM_SYNC_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads configuration from an environment source over the defaults
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("display_timezone", defaults.display_timezone)?
            .set_default("strict_schema", defaults.strict_schema)?
            .set_default("log_level", defaults.log_level)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Parses the display timezone
    pub fn timezone(&self) -> Result<Timezone, TemporalError> {
        Timezone::from_name(&self.display_timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_apply_without_variables() {
        let config = SyncConfig::load(environment(&[])).unwrap();
        assert_eq!(config.display_timezone, "UTC");
        assert!(!config.strict_schema);
        assert_eq!(config.log_level, "info");
        assert!(config.fixture_path.is_none());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = SyncConfig::load(environment(&[
            ("CRM_SYNC_DISPLAY_TIMEZONE", "America/New_York"),
            ("CRM_SYNC_STRICT_SCHEMA", "true"),
            ("CRM_SYNC_FIXTURE_PATH", "/tmp/civicrm.json"),
        ]))
        .unwrap();

        assert_eq!(config.timezone().unwrap().name(), "America/New_York");
        assert!(config.strict_schema);
        assert_eq!(config.fixture_path.as_deref(), Some("/tmp/civicrm.json"));
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let config = SyncConfig {
            display_timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.timezone(),
            Err(TemporalError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
    }
}
