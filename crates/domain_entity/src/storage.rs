//! Entity persistence port
//!
//! [`EntityStorage`] is the narrow interface to the persistence engine that
//! [`EntityLifecycle`](crate::lifecycle::EntityLifecycle) wraps. The default
//! adapter, [`CrmBackedStorage`], keeps no local copy: it normalizes the
//! entity and writes it straight to the CRM.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError};
use domain_schema::CrmApi;

use crate::entity::CrmEntity;
use crate::normalizer::ValueNormalizer;

/// Outcome of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    New,
    Updated,
}

/// Port to the content-entity persistence engine
#[async_trait]
pub trait EntityStorage: DomainPort {
    /// Persists the entity, assigning its id when it is new
    async fn save(&self, entity: &mut CrmEntity) -> Result<SaveStatus, PortError>;

    async fn delete(&self, entity: &CrmEntity) -> Result<(), PortError>;
}

/// Storage that writes entities through the CRM API
pub struct CrmBackedStorage {
    crm: Arc<dyn CrmApi>,
    normalizer: ValueNormalizer,
}

impl CrmBackedStorage {
    pub fn new(crm: Arc<dyn CrmApi>, normalizer: ValueNormalizer) -> Self {
        Self { crm, normalizer }
    }
}

impl DomainPort for CrmBackedStorage {}

#[async_trait]
impl EntityStorage for CrmBackedStorage {
    #[instrument(skip_all, fields(crm_entity = %entity.crm_entity()))]
    async fn save(&self, entity: &mut CrmEntity) -> Result<SaveStatus, PortError> {
        let params = self.normalizer.normalize(entity);
        let status = if entity.is_new() {
            SaveStatus::New
        } else {
            SaveStatus::Updated
        };
        let id = self.crm.save(entity.crm_entity(), &params).await?;
        entity.set_id(id);
        Ok(status)
    }

    #[instrument(skip_all, fields(crm_entity = %entity.crm_entity()))]
    async fn delete(&self, entity: &CrmEntity) -> Result<(), PortError> {
        match entity.id() {
            Some(id) => self.crm.delete(entity.crm_entity(), id).await,
            None => {
                debug!("Entity was never saved; nothing to delete");
                Ok(())
            }
        }
    }
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use tokio::sync::RwLock;

    use crate::hooks::{CrmOperation, CrmPostHook, PropagationDecision};

    /// What the storage saw while a call was running
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StorageObservation {
        pub operation: CrmOperation,
        /// Lifecycle flag of the entity at the time of the call
        pub flag_active: bool,
        /// What a CRM post hook fired from inside the call would decide
        pub hook_decision: PropagationDecision,
    }

    /// In-memory mock implementation of EntityStorage
    ///
    /// Assigns sequential ids, can be told to fail, and records the entity's
    /// lifecycle state during every call.
    #[derive(Debug, Default)]
    pub struct InMemoryEntityStorage {
        observations: RwLock<Vec<StorageObservation>>,
        next_id: AtomicI64,
        failing: AtomicBool,
    }

    impl InMemoryEntityStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent call fail after recording its observation
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub async fn observations(&self) -> Vec<StorageObservation> {
            self.observations.read().await.clone()
        }

        async fn observe(&self, operation: CrmOperation, entity: &CrmEntity) -> Result<(), PortError> {
            self.observations.write().await.push(StorageObservation {
                operation,
                flag_active: entity.is_content_originated(),
                hook_decision: CrmPostHook::decide(operation, entity),
            });
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::internal("mock storage failure"));
            }
            Ok(())
        }
    }

    impl DomainPort for InMemoryEntityStorage {}

    #[async_trait]
    impl EntityStorage for InMemoryEntityStorage {
        async fn save(&self, entity: &mut CrmEntity) -> Result<SaveStatus, PortError> {
            let operation = if entity.is_new() {
                CrmOperation::Create
            } else {
                CrmOperation::Edit
            };
            self.observe(operation, entity).await?;
            if entity.is_new() {
                entity.set_id(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                Ok(SaveStatus::New)
            } else {
                Ok(SaveStatus::Updated)
            }
        }

        async fn delete(&self, entity: &CrmEntity) -> Result<(), PortError> {
            self.observe(CrmOperation::Delete, entity).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CrmEntityName, EntityTypeId, FieldValue, ParamValue};
    use domain_schema::{CrmCall, EntityFieldDefinition, EntityTypeSchema, FieldType, InMemoryCrmApi};

    fn tag_schema() -> Arc<EntityTypeSchema> {
        let mut schema = EntityTypeSchema::new(
            EntityTypeId::new("civicrm_tag"),
            CrmEntityName::new("Tag"),
            "CiviCRM Tag",
        );
        let mut id = EntityFieldDefinition::new("id", FieldType::Integer, "Tag ID");
        id.read_only = true;
        schema.push(id);
        schema.push(EntityFieldDefinition::new("name", FieldType::String, "Name"));
        Arc::new(schema)
    }

    #[tokio::test]
    async fn test_crm_backed_save_assigns_id_then_updates() {
        let crm = Arc::new(InMemoryCrmApi::new());
        let storage = CrmBackedStorage::new(crm.clone(), ValueNormalizer::default());
        let mut entity = CrmEntity::new(tag_schema());
        entity.set_value("name", "Volunteer").unwrap();

        assert_eq!(storage.save(&mut entity).await.unwrap(), SaveStatus::New);
        assert_eq!(entity.id(), Some(1));

        assert_eq!(storage.save(&mut entity).await.unwrap(), SaveStatus::Updated);
        let stored = crm.record("Tag", 1).await.unwrap();
        assert_eq!(stored.get("id"), Some(&ParamValue::Single(FieldValue::Integer(1))));
        assert_eq!(stored.get("name"), Some(&ParamValue::Single("Volunteer".into())));
    }

    #[tokio::test]
    async fn test_crm_backed_delete_skips_unsaved_entity() {
        let crm = Arc::new(InMemoryCrmApi::new());
        let storage = CrmBackedStorage::new(crm.clone(), ValueNormalizer::default());
        let entity = CrmEntity::new(tag_schema());

        storage.delete(&entity).await.unwrap();
        assert!(crm.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_crm_backed_delete_forwards_id() {
        let crm = Arc::new(InMemoryCrmApi::new());
        let storage = CrmBackedStorage::new(crm.clone(), ValueNormalizer::default());
        let mut entity = CrmEntity::new(tag_schema());
        entity.set_value("name", "Donor").unwrap();
        storage.save(&mut entity).await.unwrap();

        storage.delete(&entity).await.unwrap();
        assert_eq!(crm.calls().await.last(), Some(&CrmCall::Delete("Tag".to_string(), 1)));
        assert!(crm.record("Tag", 1).await.is_none());
    }
}
