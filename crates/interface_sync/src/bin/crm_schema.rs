//! CRM Entity Bridge - Schema Inspector Binary
//!
//! Builds the content-entity schema of one exposed CRM entity type from a
//! JSON fixture of the CRM's field metadata and prints it as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Fixture path from the environment
//! CRM_SYNC_FIXTURE_PATH=civicrm.json crm-schema civicrm_contact
//!
//! # Fixture path as the second argument
//! crm-schema civicrm_activity ./fixtures/civicrm.json
//! ```
//!
//! # Environment Variables
//!
//! * `CRM_SYNC_DISPLAY_TIMEZONE` - IANA timezone the CRM expects (default: UTC)
//! * `CRM_SYNC_STRICT_SCHEMA` - Fail on untranslatable fields (default: false)
//! * `CRM_SYNC_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `CRM_SYNC_FIXTURE_PATH` - JSON fixture standing in for the CRM API

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::EntityTypeId;
use interface_sync::{FixtureCrm, SyncConfig, SyncServices};

const USAGE: &str = "usage: crm-schema <entity_type_id> [fixture_path]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = SyncConfig::from_env().context("loading CRM_SYNC_* configuration")?;
    init_tracing(&config.log_level);

    let mut args = std::env::args().skip(1);
    let Some(entity_type_id) = args.next() else {
        bail!(USAGE);
    };
    let Some(fixture_path) = args.next().or_else(|| config.fixture_path.clone()) else {
        bail!("no fixture given; pass a path or set CRM_SYNC_FIXTURE_PATH\n{USAGE}");
    };

    let crm = Arc::new(FixtureCrm::from_path(&fixture_path)?);
    let services = SyncServices::new(&config, crm.clone(), crm)?;

    let entity_type_id = EntityTypeId::new(entity_type_id);
    let schema = services
        .build_schema(&entity_type_id)
        .await
        .with_context(|| format!("building schema for {entity_type_id}"))?;

    tracing::info!(entity_type = %entity_type_id, fields = schema.len(), "Schema built");
    println!("{}", serde_json::to_string_pretty(schema.as_ref())?);
    Ok(())
}

/// Initializes the tracing subscriber on stderr so stdout stays pure JSON.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
