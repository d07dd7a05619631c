//! CRM-side ports
//!
//! The bridge consumes two collaborators when it builds schemas and validates
//! entities:
//!
//! - **`CrmApi`**: the CRM's remote API (field metadata, validation, writes).
//!   Transport, authentication, timeouts and retries belong to the adapter.
//! - **`FieldMetadataStore`**: module-supplied field overrides and
//!   required-field lists per exposed entity type.
//!
//! ```rust,ignore
//! let builder = EntitySchemaBuilder::new(
//!     Arc::new(civicrm_client) as Arc<dyn CrmApi>,
//!     Arc::new(module_metadata) as Arc<dyn FieldMetadataStore>,
//!     Arc::new(SupportedEntityTypes::default()),
//! );
//! let schema = builder.build_schema(&EntityTypeId::new("civicrm_contact")).await?;
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{CrmEntityName, DomainPort, EntityTypeId, NormalizedParams, PortError};

use crate::descriptor::{CrmFieldDescriptor, FieldAction, FieldOverride};

/// One field-level violation reported by the CRM validate endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmViolation {
    pub message: String,
    /// Anything else the CRM attached (error codes, constraint names)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl CrmViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: IndexMap::new(),
        }
    }
}

/// Violations keyed by CRM field name; empty when the record is valid
pub type CrmViolations = IndexMap<String, Vec<CrmViolation>>;

/// Opaque custom-field annotations; empty when the field is not custom
pub type CustomFieldMetadata = IndexMap<String, Value>;

/// Port to the CRM's API
#[async_trait]
pub trait CrmApi: DomainPort {
    /// Lists field descriptors of a CRM entity for an action, in API order
    async fn get_fields(
        &self,
        entity: &CrmEntityName,
        action: FieldAction,
    ) -> Result<Vec<CrmFieldDescriptor>, PortError>;

    async fn get_custom_field_metadata(
        &self,
        field_name: &str,
    ) -> Result<CustomFieldMetadata, PortError>;

    /// Runs the CRM's own validation on a parameter set without writing
    async fn validate(
        &self,
        entity: &CrmEntityName,
        params: &NormalizedParams,
    ) -> Result<CrmViolations, PortError>;

    /// Creates or updates a record, returning its id
    async fn save(
        &self,
        entity: &CrmEntityName,
        params: &NormalizedParams,
    ) -> Result<i64, PortError>;

    async fn delete(&self, entity: &CrmEntityName, id: i64) -> Result<(), PortError>;
}

/// Port to the module's per-entity-type field metadata
#[async_trait]
pub trait FieldMetadataStore: DomainPort {
    async fn get_overrides(
        &self,
        entity_type: &EntityTypeId,
    ) -> Result<IndexMap<String, FieldOverride>, PortError>;

    async fn get_required_fields(
        &self,
        entity_type: &EntityTypeId,
    ) -> Result<BTreeSet<String>, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use tokio::sync::RwLock;

    /// A call received by [`InMemoryCrmApi`]
    #[derive(Debug, Clone, PartialEq)]
    pub enum CrmCall {
        GetFields(String),
        CustomFieldMetadata(String),
        Validate(String, NormalizedParams),
        Save(String, NormalizedParams),
        Delete(String, i64),
    }

    /// In-memory mock implementation of CrmApi
    ///
    /// Serves canned field lists and validation answers, stores saved
    /// parameter sets, and records every call.
    #[derive(Debug, Default)]
    pub struct InMemoryCrmApi {
        fields: RwLock<HashMap<String, Vec<CrmFieldDescriptor>>>,
        custom_metadata: RwLock<HashMap<String, CustomFieldMetadata>>,
        violations: RwLock<HashMap<String, CrmViolations>>,
        records: RwLock<HashMap<(String, i64), NormalizedParams>>,
        calls: RwLock<Vec<CrmCall>>,
        next_id: AtomicI64,
        unavailable: AtomicBool,
    }

    impl InMemoryCrmApi {
        /// Creates a new mock API
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves the given descriptors for an entity
        pub fn with_fields(mut self, entity: &str, fields: Vec<CrmFieldDescriptor>) -> Self {
            self.fields.get_mut().insert(entity.to_string(), fields);
            self
        }

        pub fn with_custom_metadata(mut self, field: &str, metadata: CustomFieldMetadata) -> Self {
            self.custom_metadata.get_mut().insert(field.to_string(), metadata);
            self
        }

        /// Answers every validate call for an entity with these violations
        pub fn with_violations(mut self, entity: &str, violations: CrmViolations) -> Self {
            self.violations.get_mut().insert(entity.to_string(), violations);
            self
        }

        /// Replaces the field list served for an entity
        pub async fn set_fields(&self, entity: &str, fields: Vec<CrmFieldDescriptor>) {
            self.fields.write().await.insert(entity.to_string(), fields);
        }

        /// Makes every subsequent call fail with a connection error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub async fn calls(&self) -> Vec<CrmCall> {
            self.calls.read().await.clone()
        }

        /// Returns the stored parameters of a saved record
        pub async fn record(&self, entity: &str, id: i64) -> Option<NormalizedParams> {
            self.records
                .read()
                .await
                .get(&(entity.to_string(), id))
                .cloned()
        }

        async fn enter(&self, call: CrmCall) -> Result<(), PortError> {
            self.calls.write().await.push(call);
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock CRM is unavailable"));
            }
            Ok(())
        }
    }

    impl DomainPort for InMemoryCrmApi {}

    #[async_trait]
    impl CrmApi for InMemoryCrmApi {
        async fn get_fields(
            &self,
            entity: &CrmEntityName,
            _action: FieldAction,
        ) -> Result<Vec<CrmFieldDescriptor>, PortError> {
            self.enter(CrmCall::GetFields(entity.to_string())).await?;
            self.fields
                .read()
                .await
                .get(entity.as_str())
                .cloned()
                .ok_or_else(|| PortError::remote("getfields", format!("API entity {} not found", entity)))
        }

        async fn get_custom_field_metadata(
            &self,
            field_name: &str,
        ) -> Result<CustomFieldMetadata, PortError> {
            self.enter(CrmCall::CustomFieldMetadata(field_name.to_string())).await?;
            Ok(self
                .custom_metadata
                .read()
                .await
                .get(field_name)
                .cloned()
                .unwrap_or_default())
        }

        async fn validate(
            &self,
            entity: &CrmEntityName,
            params: &NormalizedParams,
        ) -> Result<CrmViolations, PortError> {
            self.enter(CrmCall::Validate(entity.to_string(), params.clone())).await?;
            Ok(self
                .violations
                .read()
                .await
                .get(entity.as_str())
                .cloned()
                .unwrap_or_default())
        }

        async fn save(
            &self,
            entity: &CrmEntityName,
            params: &NormalizedParams,
        ) -> Result<i64, PortError> {
            self.enter(CrmCall::Save(entity.to_string(), params.clone())).await?;
            let id = match params.get("id").and_then(|p| p.as_single()).and_then(|v| v.as_i64()) {
                Some(id) => id,
                None => self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            };
            self.records
                .write()
                .await
                .insert((entity.to_string(), id), params.clone());
            Ok(id)
        }

        async fn delete(&self, entity: &CrmEntityName, id: i64) -> Result<(), PortError> {
            self.enter(CrmCall::Delete(entity.to_string(), id)).await?;
            self.records
                .write()
                .await
                .remove(&(entity.to_string(), id))
                .map(|_| ())
                .ok_or_else(|| PortError::not_found(entity.as_str(), id))
        }
    }

    /// In-memory mock implementation of FieldMetadataStore
    #[derive(Debug, Default)]
    pub struct InMemoryFieldMetadataStore {
        overrides: HashMap<EntityTypeId, IndexMap<String, FieldOverride>>,
        required: HashMap<EntityTypeId, BTreeSet<String>>,
    }

    impl InMemoryFieldMetadataStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_override(
            mut self,
            entity_type: &str,
            field: &str,
            field_override: FieldOverride,
        ) -> Self {
            self.overrides
                .entry(EntityTypeId::new(entity_type))
                .or_default()
                .insert(field.to_string(), field_override);
            self
        }

        pub fn with_required(mut self, entity_type: &str, fields: &[&str]) -> Self {
            self.required
                .entry(EntityTypeId::new(entity_type))
                .or_default()
                .extend(fields.iter().map(|f| f.to_string()));
            self
        }
    }

    impl DomainPort for InMemoryFieldMetadataStore {}

    #[async_trait]
    impl FieldMetadataStore for InMemoryFieldMetadataStore {
        async fn get_overrides(
            &self,
            entity_type: &EntityTypeId,
        ) -> Result<IndexMap<String, FieldOverride>, PortError> {
            Ok(self.overrides.get(entity_type).cloned().unwrap_or_default())
        }

        async fn get_required_fields(
            &self,
            entity_type: &EntityTypeId,
        ) -> Result<BTreeSet<String>, PortError> {
            Ok(self.required.get(entity_type).cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use core_kernel::{FieldValue, ParamValue};

    #[tokio::test]
    async fn test_mock_save_assigns_ids_and_records_calls() {
        let api = InMemoryCrmApi::new();
        let contact = CrmEntityName::new("Contact");
        let mut params = NormalizedParams::new();
        params.insert("display_name".to_string(), ParamValue::Single(FieldValue::from("Acme Inc")));

        let first = api.save(&contact, &params).await.unwrap();
        let second = api.save(&contact, &params).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(api.record("Contact", 1).await, Some(params.clone()));

        api.delete(&contact, 1).await.unwrap();
        assert!(matches!(
            api.delete(&contact, 1).await,
            Err(PortError::NotFound { .. })
        ));
        assert_eq!(api.calls().await.len(), 4);
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let api = InMemoryCrmApi::new().with_fields("Contact", vec![]);
        api.set_unavailable(true);
        let err = api
            .get_fields(&CrmEntityName::new("Contact"), FieldAction::Create)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_crm_violation_keeps_extra_attributes() {
        let json = r#"{"message": "email is invalid", "code": "invalid_email"}"#;
        let violation: CrmViolation = serde_json::from_str(json).unwrap();
        assert_eq!(violation.message, "email is invalid");
        assert_eq!(violation.extra.get("code"), Some(&Value::from("invalid_email")));
    }
}
