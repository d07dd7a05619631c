//! Schema domain errors

use thiserror::Error;

use core_kernel::PortError;

/// A single CRM field could not be translated
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// The CRM type code has no content field type
    #[error("Unmapped CRM type {code} for field {field}")]
    UnmappedType { field: String, code: u32 },
}

/// Errors that abort a whole schema build
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The entity type is not one the bridge knows how to expose
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A field failed translation and strict mode is on
    #[error("Field translation failed: {0}")]
    Translation(#[from] TranslationError),

    /// A CRM API or metadata store call failed
    #[error("CRM API call failed: {0}")]
    Transport(#[from] PortError),
}

impl SchemaError {
    pub fn unknown_entity_type(id: impl std::fmt::Display) -> Self {
        SchemaError::UnknownEntityType(id.to_string())
    }
}
