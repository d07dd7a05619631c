//! Field Definition Provider
//!
//! Translates one CRM field descriptor into a content-entity field definition.
//!
//! # Type mapping
//!
//! | CRM type              | Field type                                         |
//! |-----------------------|----------------------------------------------------|
//! | Int                   | `entity_reference` (FK), `list_integer` (options), `integer` |
//! | String, Time          | `list_string` (options), `string`                  |
//! | Date                  | `datetime`, date only                              |
//! | Date + Time           | `datetime`, timezone aware                         |
//! | Boolean               | `boolean`                                          |
//! | Text, Blob, MediumBlob| `text_long`                                        |
//! | Timestamp             | `timestamp`                                        |
//! | Float                 | `float`                                            |
//! | Money                 | `decimal` (20, 2)                                  |
//! | Email                 | `email`                                            |
//! | Url                   | `uri`                                              |
//!
//! Any other type code is a [`TranslationError::UnmappedType`].

use std::sync::Arc;

use serde_json::{json, Value};

use crate::definition::{
    DisplayComponent, DisplayOptions, EntityFieldDefinition, FieldType, DATETIME_TYPE_DATE,
    DATETIME_TYPE_DATETIME, SETTING_ALLOWED_VALUES, SETTING_DATETIME_TYPE, SETTING_MAX_LENGTH,
    SETTING_PRECISION, SETTING_SCALE, SETTING_TARGET_TYPE, SETTING_UNSIGNED,
};
use crate::descriptor::{CrmApiType, CrmFieldDescriptor};
use crate::error::TranslationError;
use crate::supported::SupportedEntityTypes;

/// Stateless translator from CRM descriptors to field definitions
#[derive(Debug, Clone)]
pub struct FieldDefinitionProvider {
    supported: Arc<SupportedEntityTypes>,
}

impl FieldDefinitionProvider {
    /// Creates a provider resolving foreign keys against the given registry
    pub fn new(supported: Arc<SupportedEntityTypes>) -> Self {
        Self { supported }
    }

    /// Translates a descriptor, preserving its cardinality
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::UnmappedType` for unknown CRM type codes.
    pub fn translate(
        &self,
        descriptor: &CrmFieldDescriptor,
    ) -> Result<EntityFieldDefinition, TranslationError> {
        let api_type = descriptor
            .crm_type()
            .ok_or_else(|| TranslationError::UnmappedType {
                field: descriptor.name.clone(),
                code: descriptor.api_type,
            })?;

        if descriptor.name == "id" {
            return Ok(Self::id_definition(descriptor));
        }

        let mut definition = match api_type {
            CrmApiType::Int => self.integer_definition(descriptor),
            CrmApiType::String | CrmApiType::Time => Self::string_definition(descriptor),
            CrmApiType::Date => Self::base(descriptor, FieldType::Datetime)
                .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATE),
            CrmApiType::DateTime => Self::base(descriptor, FieldType::Datetime)
                .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATETIME),
            CrmApiType::Boolean => Self::base(descriptor, FieldType::Boolean),
            CrmApiType::Text | CrmApiType::Blob | CrmApiType::MediumBlob => {
                Self::base(descriptor, FieldType::TextLong)
            }
            CrmApiType::Timestamp => Self::base(descriptor, FieldType::Timestamp),
            CrmApiType::Float => Self::base(descriptor, FieldType::Float),
            CrmApiType::Money => Self::base(descriptor, FieldType::Decimal)
                .with_setting(SETTING_PRECISION, 20)
                .with_setting(SETTING_SCALE, 2),
            CrmApiType::Email => Self::base(descriptor, FieldType::Email),
            CrmApiType::Url => Self::base(descriptor, FieldType::Uri),
        };

        definition.display_options = Self::display_options(
            definition.field_type,
            descriptor.html_type.as_deref(),
            descriptor.read_only,
        );
        Ok(definition)
    }

    fn base(descriptor: &CrmFieldDescriptor, field_type: FieldType) -> EntityFieldDefinition {
        let mut definition =
            EntityFieldDefinition::new(&descriptor.name, field_type, descriptor.label())
                .with_cardinality(descriptor.cardinality)
                .with_required(descriptor.required);
        definition.description = descriptor.description.clone();
        definition.read_only = descriptor.read_only;
        definition
    }

    fn id_definition(descriptor: &CrmFieldDescriptor) -> EntityFieldDefinition {
        let mut definition = EntityFieldDefinition::new("id", FieldType::Integer, descriptor.label())
            .with_cardinality(descriptor.cardinality)
            .with_required(descriptor.required)
            .with_setting(SETTING_UNSIGNED, true);
        definition.description = descriptor.description.clone();
        definition.read_only = true;
        definition.display_options = Self::display_options(FieldType::Integer, None, true);
        definition
    }

    fn integer_definition(&self, descriptor: &CrmFieldDescriptor) -> EntityFieldDefinition {
        let target = descriptor
            .fk_entity
            .as_deref()
            .and_then(|fk| self.supported.by_crm_entity(fk));

        if let Some(target) = target {
            Self::base(descriptor, FieldType::EntityReference)
                .with_setting(SETTING_TARGET_TYPE, target.id.as_str())
        } else if descriptor.has_options() {
            Self::base(descriptor, FieldType::ListInteger)
                .with_setting(SETTING_ALLOWED_VALUES, Self::allowed_values(descriptor))
        } else {
            Self::base(descriptor, FieldType::Integer)
        }
    }

    fn string_definition(descriptor: &CrmFieldDescriptor) -> EntityFieldDefinition {
        if descriptor.has_options() {
            return Self::base(descriptor, FieldType::ListString)
                .with_setting(SETTING_ALLOWED_VALUES, Self::allowed_values(descriptor));
        }
        let definition = Self::base(descriptor, FieldType::String);
        match descriptor.max_length {
            Some(max) => definition.with_setting(SETTING_MAX_LENGTH, max),
            None => definition,
        }
    }

    fn allowed_values(descriptor: &CrmFieldDescriptor) -> Value {
        let entries = descriptor
            .options
            .iter()
            .flatten()
            .map(|(value, label)| json!({ "value": value, "label": label }))
            .collect();
        Value::Array(entries)
    }

    fn display_options(
        field_type: FieldType,
        html_type: Option<&str>,
        read_only: bool,
    ) -> DisplayOptions {
        let widget = match field_type {
            FieldType::String => "string_textfield",
            FieldType::TextLong => "string_textarea",
            FieldType::Integer | FieldType::Float | FieldType::Decimal => "number",
            FieldType::Boolean => "boolean_checkbox",
            FieldType::Email => "email_default",
            FieldType::Uri => "uri",
            FieldType::Datetime => "datetime_default",
            FieldType::Timestamp => "datetime_timestamp",
            FieldType::EntityReference => "entity_reference_autocomplete",
            FieldType::ListString | FieldType::ListInteger => match html_type {
                Some("Radio") | Some("CheckBox") => "options_buttons",
                _ => "options_select",
            },
        };
        let formatter = match field_type {
            FieldType::String => "string",
            FieldType::TextLong => "basic_string",
            FieldType::Integer => "number_integer",
            FieldType::Float | FieldType::Decimal => "number_decimal",
            FieldType::Boolean => "boolean",
            FieldType::Email => "email_mailto",
            FieldType::Uri => "uri_link",
            FieldType::Datetime => "datetime_default",
            FieldType::Timestamp => "timestamp",
            FieldType::EntityReference => "entity_reference_label",
            FieldType::ListString | FieldType::ListInteger => "list_default",
        };

        DisplayOptions {
            form: (!read_only).then(|| DisplayComponent::new(widget, 0)),
            view: Some(DisplayComponent::new(formatter, 0)),
        }
    }
}

impl Default for FieldDefinitionProvider {
    fn default() -> Self {
        Self::new(Arc::new(SupportedEntityTypes::default()))
    }
}
