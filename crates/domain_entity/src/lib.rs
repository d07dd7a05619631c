//! CRM-Backed Content Entities
//!
//! Runtime side of the bridge: one generic [`CrmEntity`] type parameterized
//! by an [`EntityTypeSchema`](domain_schema::EntityTypeSchema), plus the
//! operations that move its values toward the CRM.
//!
//! # Components
//!
//! - **`ValueNormalizer`**: entity values to flat CRM API parameters
//! - **`LocalValidator`** and **`CrossSystemValidator`**: field-level
//!   violations from both systems, merged into one [`ViolationList`]
//! - **`EntityLifecycle`**: save/delete with the loop-guard flag raised
//! - **`CrmPostHook`**: lets CRM-triggered hooks skip content-originated changes
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use core_kernel::{CrmEntityName, EntityTypeId, ParamValue};
//! use domain_schema::{EntityFieldDefinition, EntityTypeSchema, FieldType};
//! use domain_entity::{CrmEntity, ValueNormalizer};
//!
//! let mut schema = EntityTypeSchema::new(
//!     EntityTypeId::new("civicrm_contact"),
//!     CrmEntityName::new("Contact"),
//!     "CiviCRM Contact",
//! );
//! schema.push(EntityFieldDefinition::new("organization_name", FieldType::String, "Organization"));
//!
//! let mut contact = CrmEntity::new(Arc::new(schema));
//! contact.set_value("organization_name", "Acme Inc").unwrap();
//!
//! let params = ValueNormalizer::default().normalize(&contact);
//! assert_eq!(params["organization_name"], ParamValue::Single("Acme Inc".into()));
//! ```

pub mod entity;
pub mod normalizer;
pub mod violation;
pub mod constraints;
pub mod validator;
pub mod lifecycle;
pub mod storage;
pub mod hooks;
pub mod error;

pub use entity::{CrmEntity, FieldItem, FieldRef, ID_FIELD};
pub use normalizer::ValueNormalizer;
pub use violation::{FieldViolation, ViolationList, ViolationOrigin};
pub use constraints::LocalValidator;
pub use validator::CrossSystemValidator;
pub use lifecycle::{EntityLifecycle, LifecycleFlag, LifecycleGuard, LifecycleOperation};
pub use storage::{CrmBackedStorage, EntityStorage, SaveStatus};
#[cfg(any(test, feature = "mock"))]
pub use storage::mock::{InMemoryEntityStorage, StorageObservation};
pub use hooks::{CrmOperation, CrmPostHook, PropagationDecision};
pub use error::EntityError;
