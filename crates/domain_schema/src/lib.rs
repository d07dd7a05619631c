//! Entity Schema Domain
//!
//! Turns the CRM's API-described, dynamically typed fields into statically
//! declared content-entity field definitions.
//!
//! # Components
//!
//! - **`FieldDefinitionProvider`**: translates one [`CrmFieldDescriptor`] into an
//!   [`EntityFieldDefinition`]
//! - **`EntitySchemaBuilder`**: builds the ordered [`EntityTypeSchema`] of an
//!   exposed entity type from the CRM API and module metadata
//!
//! # Examples
//!
//! ```rust
//! use domain_schema::{CrmFieldDescriptor, FieldDefinitionProvider, FieldType};
//!
//! let provider = FieldDefinitionProvider::default();
//! let mut descriptor = CrmFieldDescriptor::new("email", 2048);
//! descriptor.title = Some("Email Address".to_string());
//!
//! let definition = provider.translate(&descriptor).unwrap();
//! assert_eq!(definition.field_type, FieldType::Email);
//! assert_eq!(definition.label, "Email Address");
//! ```

pub mod descriptor;
pub mod definition;
pub mod provider;
pub mod builder;
pub mod supported;
pub mod ports;
pub mod error;

pub use descriptor::{Cardinality, CrmApiType, CrmFieldDescriptor, FieldAction, FieldOverride};
pub use definition::{
    DisplayComponent, DisplayOptions, EntityFieldDefinition, EntityTypeSchema, FieldType,
};
pub use provider::FieldDefinitionProvider;
pub use builder::{EntitySchemaBuilder, ACTIVITY_END_DATETIME};
pub use supported::{SupportedEntityType, SupportedEntityTypes, ACTIVITY_ENTITY};
pub use ports::{CrmApi, CrmViolation, CrmViolations, CustomFieldMetadata, FieldMetadataStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{CrmCall, InMemoryCrmApi, InMemoryFieldMetadataStore};
pub use error::{SchemaError, TranslationError};
