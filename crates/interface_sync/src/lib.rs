//! CRM Sync Interface Layer
//!
//! Outer layer of the bridge: configuration, adapters for the CRM-side
//! ports, and the composition root that wires them into the domain services.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_sync::{FixtureCrm, SyncConfig, SyncServices};
//!
//! let config = SyncConfig::from_env()?;
//! let crm = Arc::new(FixtureCrm::from_path("civicrm.json")?);
//! let services = SyncServices::new(&config, crm.clone(), crm)?;
//! let schema = services.build_schema(&EntityTypeId::new("civicrm_contact")).await?;
//! ```

pub mod config;
pub mod error;
pub mod adapters;
pub mod services;

pub use crate::config::SyncConfig;
pub use error::SyncError;
pub use adapters::{CrmFixture, FixtureCrm};
pub use services::SyncServices;
