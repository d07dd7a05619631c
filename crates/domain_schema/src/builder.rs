//! Entity Schema Builder
//!
//! Builds the field schema of one exposed CRM entity type:
//!
//! 1. fetch the creatable field descriptors from the CRM API
//! 2. fetch the module's overrides and required-field list
//! 3. merge, translate, and annotate each descriptor in API order
//! 4. append `activity_end_datetime` for the activity type
//!
//! A field whose CRM type cannot be translated is skipped with a warning,
//! unless the builder is strict, in which case the whole build fails.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use core_kernel::EntityTypeId;

use crate::definition::{
    DisplayComponent, DisplayOptions, EntityFieldDefinition, EntityTypeSchema, FieldType,
    DATETIME_TYPE_DATETIME, SETTING_CUSTOM_FIELD_METADATA, SETTING_DATETIME_TYPE,
};
use crate::descriptor::FieldAction;
use crate::error::SchemaError;
use crate::ports::{CrmApi, FieldMetadataStore};
use crate::provider::FieldDefinitionProvider;
use crate::supported::SupportedEntityTypes;

/// Name of the synthetic computed field on activity entities
pub const ACTIVITY_END_DATETIME: &str = "activity_end_datetime";

/// Builds [`EntityTypeSchema`]s from the CRM API
pub struct EntitySchemaBuilder {
    crm: Arc<dyn CrmApi>,
    metadata: Arc<dyn FieldMetadataStore>,
    supported: Arc<SupportedEntityTypes>,
    provider: FieldDefinitionProvider,
    strict: bool,
}

impl EntitySchemaBuilder {
    pub fn new(
        crm: Arc<dyn CrmApi>,
        metadata: Arc<dyn FieldMetadataStore>,
        supported: Arc<SupportedEntityTypes>,
    ) -> Self {
        let provider = FieldDefinitionProvider::new(Arc::clone(&supported));
        Self {
            crm,
            metadata,
            supported,
            provider,
            strict: false,
        }
    }

    /// Fails the build on the first untranslatable field instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builds the schema of an exposed entity type
    ///
    /// # Errors
    ///
    /// - `SchemaError::UnknownEntityType` if the id is not a supported type
    /// - `SchemaError::Transport` if a CRM API or metadata call fails
    /// - `SchemaError::Translation` in strict mode when a field cannot be translated
    #[instrument(skip(self), fields(entity_type = %entity_type_id))]
    pub async fn build_schema(
        &self,
        entity_type_id: &EntityTypeId,
    ) -> Result<EntityTypeSchema, SchemaError> {
        let entity_type = self
            .supported
            .get(entity_type_id)
            .ok_or_else(|| SchemaError::unknown_entity_type(entity_type_id))?;

        let descriptors = self
            .crm
            .get_fields(&entity_type.crm_entity, FieldAction::Create)
            .await?;
        let overrides = self.metadata.get_overrides(entity_type_id).await?;
        let required = self.metadata.get_required_fields(entity_type_id).await?;

        let mut schema = EntityTypeSchema::new(
            entity_type.id.clone(),
            entity_type.crm_entity.clone(),
            entity_type.label.clone(),
        );

        for (position, base) in descriptors.iter().enumerate() {
            let descriptor = match overrides.get(&base.name) {
                Some(field_override) => field_override.apply(base),
                None => base.clone(),
            };

            let mut definition = match self.provider.translate(&descriptor) {
                Ok(definition) => definition,
                Err(err) if self.strict => return Err(err.into()),
                Err(err) => {
                    warn!(field = %descriptor.name, error = %err, "Skipping untranslatable CRM field");
                    continue;
                }
            };

            if required.contains(&descriptor.name) {
                definition.required = true;
            }

            let custom = self.crm.get_custom_field_metadata(&descriptor.name).await?;
            if !custom.is_empty() {
                definition.settings.insert(
                    SETTING_CUSTOM_FIELD_METADATA.to_string(),
                    serde_json::Value::Object(custom.into_iter().collect()),
                );
            }

            definition.display_options.set_weight(position as i32);
            schema.push(definition);
        }

        if entity_type.is_activity() {
            schema.push(activity_end_datetime(descriptors.len() as i32));
        }

        debug!(fields = schema.len(), "Built entity type schema");
        Ok(schema)
    }
}

/// Computed end date/time of an activity (start plus duration)
///
/// The value itself is produced by a field-computation collaborator.
fn activity_end_datetime(weight: i32) -> EntityFieldDefinition {
    let mut definition =
        EntityFieldDefinition::new(ACTIVITY_END_DATETIME, FieldType::Datetime, "Activity End Date")
            .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATETIME);
    definition.description = Some("The end date and time of the activity.".to_string());
    definition.computed = true;
    definition.read_only = true;
    definition.display_options = DisplayOptions {
        form: None,
        view: Some(DisplayComponent::new("datetime_default", weight)),
    };
    definition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{CrmFieldDescriptor, FieldOverride};
    use crate::ports::mock::{InMemoryCrmApi, InMemoryFieldMetadataStore};

    fn builder(crm: InMemoryCrmApi, metadata: InMemoryFieldMetadataStore) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(
            Arc::new(crm),
            Arc::new(metadata),
            Arc::new(SupportedEntityTypes::default()),
        )
    }

    #[tokio::test]
    async fn test_unknown_entity_type() {
        let builder = builder(InMemoryCrmApi::new(), InMemoryFieldMetadataStore::new());
        let result = builder.build_schema(&EntityTypeId::new("civicrm_widget")).await;
        assert!(matches!(result, Err(SchemaError::UnknownEntityType(id)) if id == "civicrm_widget"));
    }

    #[tokio::test]
    async fn test_override_applied_before_translation() {
        let crm = InMemoryCrmApi::new()
            .with_fields("Tag", vec![CrmFieldDescriptor::new("name", 2)]);
        let metadata = InMemoryFieldMetadataStore::new().with_override(
            "civicrm_tag",
            "name",
            FieldOverride {
                api_type: Some(32),
                title: Some("Tag Name".to_string()),
                ..Default::default()
            },
        );

        let schema = builder(crm, metadata)
            .build_schema(&EntityTypeId::new("civicrm_tag"))
            .await
            .unwrap();

        let name = schema.field("name").unwrap();
        assert_eq!(name.field_type, FieldType::TextLong);
        assert_eq!(name.label, "Tag Name");
    }

    #[test]
    fn test_activity_end_datetime_is_computed() {
        let def = activity_end_datetime(7);
        assert!(def.computed);
        assert!(def.read_only);
        assert!(def.is_timezone_aware());
        assert!(def.display_options.form.is_none());
        assert_eq!(def.display_options.view.unwrap().weight, 7);
    }
}
