//! Ports and Adapters Infrastructure
//!
//! The bridge talks to three external collaborators: the CRM API, the module's
//! field metadata store, and the content-entity persistence engine. Each one is
//! a port trait defined next to the domain that consumes it; adapters implement
//! those traits.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  Schema builder / validator / entity lifecycle │
//! └───────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌───────────────────────────────────────────────┐
//! │   Port traits: CrmApi, FieldMetadataStore,     │
//! │   EntityStorage                                │
//! └───────────────────────────────────────────────┘
//!           ▲                         ▲
//!  ┌────────┴────────┐      ┌─────────┴────────┐
//!  │  CRM transport  │      │  In-memory mock  │
//!  │  (external)     │      │  / JSON fixture  │
//!  └─────────────────┘      └──────────────────┘
//! ```
//!
//! All port implementations report failures through [`PortError`]. The bridge
//! never retries: a port error is fatal for the operation that hit it.

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across transports and test doubles.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested record was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote API answered with an error result
    #[error("Remote API error in {action}: {message}")]
    Remote {
        action: String,
        message: String,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Remote error for a failed API action
    pub fn remote(action: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Remote {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    ///
    /// The bridge itself never retries; this is for transports that do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::ServiceUnavailable { .. }
        )
    }
}

/// Marker trait for all ports
///
/// All port traits extend this marker so they can be shared across
/// async tasks behind an `Arc`.
pub trait DomainPort: Send + Sync + 'static {}
