//! Composition root
//!
//! Wires the configured display timezone and the CRM-side ports into the
//! schema builder, validator, and entity lifecycle. Nothing in the domain
//! crates looks services up on its own; everything arrives through here.

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::EntityTypeId;
use domain_entity::{
    CrmBackedStorage, CrmEntity, CrossSystemValidator, EntityLifecycle, EntityStorage,
    ValueNormalizer,
};
use domain_schema::{CrmApi, EntitySchemaBuilder, EntityTypeSchema, FieldMetadataStore, SupportedEntityTypes};

use crate::config::SyncConfig;
use crate::error::SyncError;

/// The bridge's services, built once per process
pub struct SyncServices {
    schema_builder: EntitySchemaBuilder,
    normalizer: ValueNormalizer,
    validator: CrossSystemValidator,
    lifecycle: EntityLifecycle,
}

impl SyncServices {
    /// Builds the services with CRM-backed entity storage
    pub fn new(
        config: &SyncConfig,
        crm: Arc<dyn CrmApi>,
        metadata: Arc<dyn FieldMetadataStore>,
    ) -> Result<Self, SyncError> {
        let normalizer = ValueNormalizer::new(config.timezone()?);
        let storage = Arc::new(CrmBackedStorage::new(Arc::clone(&crm), normalizer));
        Self::with_storage(config, crm, metadata, storage)
    }

    /// Builds the services around a caller-supplied persistence engine
    pub fn with_storage(
        config: &SyncConfig,
        crm: Arc<dyn CrmApi>,
        metadata: Arc<dyn FieldMetadataStore>,
        storage: Arc<dyn EntityStorage>,
    ) -> Result<Self, SyncError> {
        let timezone = config.timezone()?;
        let normalizer = ValueNormalizer::new(timezone);
        let schema_builder = EntitySchemaBuilder::new(
            Arc::clone(&crm),
            metadata,
            Arc::new(SupportedEntityTypes::default()),
        )
        .strict(config.strict_schema);

        info!(
            display_timezone = timezone.name(),
            strict_schema = config.strict_schema,
            "CRM sync services initialized"
        );

        Ok(Self {
            schema_builder,
            normalizer,
            validator: CrossSystemValidator::new(crm, normalizer),
            lifecycle: EntityLifecycle::new(storage),
        })
    }

    /// Builds the schema of an exposed entity type
    #[instrument(skip(self), fields(entity_type = %entity_type_id))]
    pub async fn build_schema(
        &self,
        entity_type_id: &EntityTypeId,
    ) -> Result<Arc<EntityTypeSchema>, SyncError> {
        let schema = self.schema_builder.build_schema(entity_type_id).await?;
        Ok(Arc::new(schema))
    }

    /// Builds the schema and returns an empty entity of that type
    pub async fn new_entity(&self, entity_type_id: &EntityTypeId) -> Result<CrmEntity, SyncError> {
        Ok(CrmEntity::new(self.build_schema(entity_type_id).await?))
    }

    pub fn normalizer(&self) -> &ValueNormalizer {
        &self.normalizer
    }

    pub fn validator(&self) -> &CrossSystemValidator {
        &self.validator
    }

    pub fn lifecycle(&self) -> &EntityLifecycle {
        &self.lifecycle
    }
}
