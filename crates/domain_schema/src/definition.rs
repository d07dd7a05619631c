//! Content-entity field definitions and entity type schemas
//!
//! An [`EntityTypeSchema`] is built once per entity type registration and is
//! read-only afterwards. Entities share it through an `Arc`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{CrmEntityName, EntityTypeId};

use crate::descriptor::Cardinality;

/// `allowed_values`: ordered list of `{value, label}` objects
pub const SETTING_ALLOWED_VALUES: &str = "allowed_values";
/// `datetime_type`: `date` or `datetime`
pub const SETTING_DATETIME_TYPE: &str = "datetime_type";
/// `target_type`: referenced content entity type id
pub const SETTING_TARGET_TYPE: &str = "target_type";
pub const SETTING_MAX_LENGTH: &str = "max_length";
pub const SETTING_PRECISION: &str = "precision";
pub const SETTING_SCALE: &str = "scale";
pub const SETTING_UNSIGNED: &str = "unsigned";
/// Opaque custom-field annotations for display logic
pub const SETTING_CUSTOM_FIELD_METADATA: &str = "custom_field_metadata";

pub const DATETIME_TYPE_DATE: &str = "date";
pub const DATETIME_TYPE_DATETIME: &str = "datetime";

/// Content-entity field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    TextLong,
    Integer,
    Float,
    Decimal,
    Boolean,
    Email,
    Uri,
    Datetime,
    Timestamp,
    EntityReference,
    ListString,
    ListInteger,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::TextLong => "text_long",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Email => "email",
            FieldType::Uri => "uri",
            FieldType::Datetime => "datetime",
            FieldType::Timestamp => "timestamp",
            FieldType::EntityReference => "entity_reference",
            FieldType::ListString => "list_string",
            FieldType::ListInteger => "list_integer",
        }
    }

    /// Name of the item property holding the field's primary value
    pub fn main_property(&self) -> &'static str {
        match self {
            FieldType::EntityReference => "target_id",
            _ => "value",
        }
    }

    pub fn is_option_list(&self) -> bool {
        matches!(self, FieldType::ListString | FieldType::ListInteger)
    }
}

/// A widget or formatter assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayComponent {
    #[serde(rename = "type")]
    pub kind: String,
    pub weight: i32,
}

impl DisplayComponent {
    pub fn new(kind: impl Into<String>, weight: i32) -> Self {
        Self {
            kind: kind.into(),
            weight,
        }
    }
}

/// Form and view display metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<DisplayComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<DisplayComponent>,
}

impl DisplayOptions {
    pub fn set_weight(&mut self, weight: i32) {
        if let Some(form) = self.form.as_mut() {
            form.weight = weight;
        }
        if let Some(view) = self.view.as_mut() {
            view.weight = weight;
        }
    }
}

/// Field definition on the content side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub settings: IndexMap<String, Value>,
    pub required: bool,
    pub computed: bool,
    pub read_only: bool,
    #[serde(default)]
    pub display_options: DisplayOptions,
}

impl EntityFieldDefinition {
    /// Creates a single-valued, optional, stored definition
    pub fn new(name: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: label.into(),
            description: None,
            cardinality: Cardinality::SINGLE,
            settings: IndexMap::new(),
            required: false,
            computed: false,
            read_only: false,
            display_options: DisplayOptions::default(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn main_property(&self) -> &'static str {
        self.field_type.main_property()
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// True for date/time fields that carry a time component in UTC
    pub fn is_timezone_aware(&self) -> bool {
        self.field_type == FieldType::Datetime
            && self.setting(SETTING_DATETIME_TYPE).and_then(Value::as_str)
                == Some(DATETIME_TYPE_DATETIME)
    }

    /// Keys of the option list, in order
    pub fn allowed_values(&self) -> Option<Vec<&str>> {
        let entries = self.setting(SETTING_ALLOWED_VALUES)?.as_array()?;
        Some(
            entries
                .iter()
                .filter_map(|entry| entry.get("value").and_then(Value::as_str))
                .collect(),
        )
    }

    pub fn max_length(&self) -> Option<u64> {
        self.setting(SETTING_MAX_LENGTH).and_then(Value::as_u64)
    }
}

/// Ordered field schema of one exposed CRM entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeSchema {
    pub entity_type_id: EntityTypeId,
    pub crm_entity: CrmEntityName,
    pub label: String,
    fields: IndexMap<String, EntityFieldDefinition>,
}

impl EntityTypeSchema {
    pub fn new(
        entity_type_id: EntityTypeId,
        crm_entity: CrmEntityName,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type_id,
            crm_entity,
            label: label.into(),
            fields: IndexMap::new(),
        }
    }

    /// Appends a field definition, replacing one with the same name in place
    pub fn push(&mut self, definition: EntityFieldDefinition) {
        self.fields.insert(definition.name.clone(), definition);
    }

    pub fn field(&self, name: &str) -> Option<&EntityFieldDefinition> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field definitions in schema order
    pub fn fields(&self) -> impl Iterator<Item = &EntityFieldDefinition> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Human-readable label of a field
    pub fn label_of(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|def| def.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
