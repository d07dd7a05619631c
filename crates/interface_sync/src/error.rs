//! Sync error handling

use thiserror::Error;

use core_kernel::TemporalError;
use domain_entity::EntityError;
use domain_schema::SchemaError;

/// Errors surfaced by the composition root and its adapters
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid display timezone: {0}")]
    Timezone(#[from] TemporalError),

    #[error("Cannot read fixture {path}: {source}")]
    FixtureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture: {0}")]
    FixtureFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Entity(#[from] EntityError),
}
