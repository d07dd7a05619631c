//! Adapters for the CRM-side ports
//!
//! - **FixtureCrm**: serves `CrmApi` and `FieldMetadataStore` from a JSON document
//!
//! The live CRM transport is an external collaborator and is not part of
//! this workspace. Any type implementing the ports can be handed to
//! [`SyncServices`](crate::SyncServices).

pub mod fixture;

pub use fixture::{CrmFixture, FixtureCrm};
