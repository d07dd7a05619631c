//! Entity domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::lifecycle::LifecycleOperation;

/// Errors raised by entity operations
#[derive(Debug, Error)]
pub enum EntityError {
    /// The CRM or the storage engine failed
    #[error("Port error: {0}")]
    Port(#[from] PortError),

    #[error("Unknown field {field} on entity type {entity_type}")]
    UnknownField { entity_type: String, field: String },

    /// A configurable field collides with a base field
    #[error("Field already defined: {0}")]
    DuplicateField(String),

    /// A save or delete started while another one was running on the same instance
    #[error("Re-entrant {operation} on {entity_type} while a content-side mutation is in progress")]
    LifecycleInvariantViolation {
        entity_type: String,
        operation: LifecycleOperation,
    },
}

impl EntityError {
    /// True if the CRM or storage was unreachable rather than refusing the data
    pub fn is_transient(&self) -> bool {
        matches!(self, EntityError::Port(err) if err.is_transient())
    }
}
