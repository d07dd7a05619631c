//! JSON Fixture CRM Adapter
//!
//! Serves CRM field metadata, module overrides, and canned validation
//! results from a JSON document, so schemas can be built and inspected
//! without a live CRM:
//!
//! ```json
//! {
//!   "fields": {
//!     "Contact": [
//!       {"name": "id", "type": 1, "title": "Contact ID"},
//!       {"name": "email", "type": 2048, "title": "Email Address"}
//!     ]
//!   },
//!   "overrides": {"civicrm_contact": {"email": {"required": true}}},
//!   "required": {"civicrm_contact": ["email"]},
//!   "custom_metadata": {"custom_12": {"custom_group_id": 3}},
//!   "violations": {"Contact": {"email": [{"message": "email is invalid"}]}}
//! }
//! ```
//!
//! Every section is optional. The fixture is read-only: `save` and `delete`
//! report the CRM as unavailable.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use core_kernel::{CrmEntityName, DomainPort, EntityTypeId, NormalizedParams, PortError};
use domain_schema::{
    CrmApi, CrmFieldDescriptor, CrmViolations, CustomFieldMetadata, FieldAction, FieldMetadataStore,
    FieldOverride,
};

use crate::error::SyncError;

/// Parsed fixture document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrmFixture {
    /// Field descriptors keyed by CRM entity name
    pub fields: IndexMap<String, Vec<CrmFieldDescriptor>>,
    /// Field overrides keyed by content entity type id
    pub overrides: IndexMap<String, IndexMap<String, FieldOverride>>,
    /// Required field names keyed by content entity type id
    pub required: IndexMap<String, BTreeSet<String>>,
    /// Custom-field annotations keyed by CRM field name
    pub custom_metadata: IndexMap<String, CustomFieldMetadata>,
    /// Validate answers keyed by CRM entity name
    pub violations: IndexMap<String, CrmViolations>,
}

/// CRM API and field metadata store backed by a [`CrmFixture`]
#[derive(Debug, Clone, Default)]
pub struct FixtureCrm {
    fixture: CrmFixture,
}

impl FixtureCrm {
    pub fn new(fixture: CrmFixture) -> Self {
        Self { fixture }
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Reads and parses a fixture file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SyncError::FixtureIo {
            path: path.display().to_string(),
            source,
        })?;
        let crm = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            entities = crm.fixture.fields.len(),
            "Loaded CRM fixture"
        );
        Ok(crm)
    }

    pub fn fixture(&self) -> &CrmFixture {
        &self.fixture
    }

    fn read_only(action: &str) -> PortError {
        PortError::ServiceUnavailable {
            service: format!("fixture CRM ({action})"),
        }
    }
}

impl DomainPort for FixtureCrm {}

#[async_trait]
impl CrmApi for FixtureCrm {
    async fn get_fields(
        &self,
        entity: &CrmEntityName,
        action: FieldAction,
    ) -> Result<Vec<CrmFieldDescriptor>, PortError> {
        debug!(%entity, action = action.as_str(), "getfields");
        self.fixture
            .fields
            .get(entity.as_str())
            .cloned()
            .ok_or_else(|| PortError::remote("getfields", format!("API entity {} not found", entity)))
    }

    async fn get_custom_field_metadata(
        &self,
        field_name: &str,
    ) -> Result<CustomFieldMetadata, PortError> {
        Ok(self
            .fixture
            .custom_metadata
            .get(field_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn validate(
        &self,
        entity: &CrmEntityName,
        _params: &NormalizedParams,
    ) -> Result<CrmViolations, PortError> {
        Ok(self
            .fixture
            .violations
            .get(entity.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn save(
        &self,
        _entity: &CrmEntityName,
        _params: &NormalizedParams,
    ) -> Result<i64, PortError> {
        Err(Self::read_only("save"))
    }

    async fn delete(&self, _entity: &CrmEntityName, _id: i64) -> Result<(), PortError> {
        Err(Self::read_only("delete"))
    }
}

#[async_trait]
impl FieldMetadataStore for FixtureCrm {
    async fn get_overrides(
        &self,
        entity_type: &EntityTypeId,
    ) -> Result<IndexMap<String, FieldOverride>, PortError> {
        Ok(self
            .fixture
            .overrides
            .get(entity_type.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_required_fields(
        &self,
        entity_type: &EntityTypeId,
    ) -> Result<BTreeSet<String>, PortError> {
        Ok(self
            .fixture
            .required
            .get(entity_type.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
