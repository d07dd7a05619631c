//! Core Kernel - Foundational types for the CRM entity bridge
//!
//! This crate provides the building blocks shared by the schema and entity crates:
//! - Field values and normalized CRM API parameters
//! - Display-timezone handling for date/time values
//! - Typed identifiers for entity types and entity instances
//! - The port error type every external collaborator reports through

pub mod value;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use value::{FieldValue, ParamValue, NormalizedParams};
pub use temporal::{
    parse_storage_datetime, Timezone, TemporalError, CRM_DATETIME_FORMAT, STORAGE_DATETIME_FORMAT,
};
pub use identifiers::{EntityTypeId, CrmEntityName, EntityUuid};
pub use ports::{PortError, DomainPort};
