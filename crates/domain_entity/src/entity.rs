//! Generic CRM-backed content entity
//!
//! One `CrmEntity` type serves every exposed CRM entity type; what fields it
//! has is decided by the [`EntityTypeSchema`] it is created with. Base fields
//! come from the schema. Configurable (non-base) fields can be attached per
//! instance; they are validated locally but never sent to the CRM.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use core_kernel::{CrmEntityName, EntityTypeId, EntityUuid, FieldValue};
use domain_schema::{EntityFieldDefinition, EntityTypeSchema};

use crate::error::EntityError;
use crate::lifecycle::LifecycleFlag;

/// Name of the primary key field
pub const ID_FIELD: &str = "id";

/// One item of a field: an ordered map of named properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldItem {
    properties: IndexMap<String, FieldValue>,
}

impl FieldItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item with a `value` property
    pub fn value(value: impl Into<FieldValue>) -> Self {
        Self::new().with("value", value)
    }

    /// Entity reference item with a `target_id` property
    pub fn target(id: i64) -> Self {
        Self::new().with("target_id", id)
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&FieldValue> {
        self.properties.get(property)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<FieldValue>) {
        self.properties.insert(property.into(), value.into());
    }

    /// An item is empty when its main property is missing or empty
    pub fn is_empty(&self, main_property: &str) -> bool {
        self.get(main_property).map_or(true, FieldValue::is_empty)
    }
}

/// Borrowed view of one field on an entity
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub name: &'a str,
    pub definition: &'a EntityFieldDefinition,
    pub is_base: bool,
    pub items: &'a [FieldItem],
}

impl<'a> FieldRef<'a> {
    /// Main-property values of the non-empty items, by delta
    pub fn main_values(&self) -> impl Iterator<Item = &'a FieldValue> + 'a {
        let main = self.definition.main_property();
        let items: &'a [FieldItem] = self.items;
        items
            .iter()
            .filter_map(move |item| item.get(main))
            .filter(|value| !value.is_empty())
    }
}

/// Content entity backed by a CRM record
#[derive(Debug)]
pub struct CrmEntity {
    schema: Arc<EntityTypeSchema>,
    uuid: EntityUuid,
    configurable: IndexMap<String, EntityFieldDefinition>,
    values: HashMap<String, Vec<FieldItem>>,
    lifecycle: LifecycleFlag,
}

impl CrmEntity {
    /// Creates an unsaved entity with no values
    pub fn new(schema: Arc<EntityTypeSchema>) -> Self {
        Self {
            schema,
            uuid: EntityUuid::new(),
            configurable: IndexMap::new(),
            values: HashMap::new(),
            lifecycle: LifecycleFlag::default(),
        }
    }

    pub fn schema(&self) -> &EntityTypeSchema {
        &self.schema
    }

    pub fn entity_type_id(&self) -> &EntityTypeId {
        &self.schema.entity_type_id
    }

    pub fn crm_entity(&self) -> &CrmEntityName {
        &self.schema.crm_entity
    }

    pub fn uuid(&self) -> EntityUuid {
        self.uuid
    }

    /// CRM record id, once the entity has been saved
    pub fn id(&self) -> Option<i64> {
        self.values
            .get(ID_FIELD)?
            .first()?
            .get("value")
            .and_then(FieldValue::as_i64)
    }

    pub fn set_id(&mut self, id: i64) {
        self.values
            .insert(ID_FIELD.to_string(), vec![FieldItem::value(id)]);
    }

    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Attaches a configurable field that is not part of the CRM schema
    pub fn attach_field(&mut self, definition: EntityFieldDefinition) -> Result<(), EntityError> {
        if self.schema.contains(&definition.name) {
            return Err(EntityError::DuplicateField(definition.name));
        }
        self.configurable.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn definition(&self, name: &str) -> Option<&EntityFieldDefinition> {
        self.schema
            .field(name)
            .or_else(|| self.configurable.get(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.definition(name).is_some()
    }

    pub fn is_base_field(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    /// Items of a field; empty for unknown or unset fields
    pub fn get(&self, name: &str) -> &[FieldItem] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the items of a field
    pub fn set(&mut self, name: &str, items: Vec<FieldItem>) -> Result<(), EntityError> {
        if !self.has_field(name) {
            return Err(EntityError::UnknownField {
                entity_type: self.entity_type_id().to_string(),
                field: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), items);
        Ok(())
    }

    /// Sets a field to one item holding `value` in its main property
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), EntityError> {
        self.set_values(name, vec![value.into()])
    }

    /// Sets a field to one item per value, in delta order
    pub fn set_values<V: Into<FieldValue>>(
        &mut self,
        name: &str,
        values: Vec<V>,
    ) -> Result<(), EntityError> {
        let main = self
            .definition(name)
            .map(EntityFieldDefinition::main_property)
            .unwrap_or("value");
        let items = values
            .into_iter()
            .map(|value| FieldItem::new().with(main, value))
            .collect();
        self.set(name, items)
    }

    /// Base fields in schema order, then configurable fields
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        let base = self.schema.fields().map(|definition| (definition, true));
        let configurable = self.configurable.values().map(|definition| (definition, false));
        base.chain(configurable).map(|(definition, is_base)| FieldRef {
            name: definition.name.as_str(),
            definition,
            is_base,
            items: self.get(&definition.name),
        })
    }

    pub fn lifecycle(&self) -> &LifecycleFlag {
        &self.lifecycle
    }

    /// True while a content-side save or delete of this entity is running
    pub fn is_content_originated(&self) -> bool {
        self.lifecycle.is_active()
    }
}

// A clone is a separate instance and starts idle
impl Clone for CrmEntity {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            uuid: self.uuid,
            configurable: self.configurable.clone(),
            values: self.values.clone(),
            lifecycle: LifecycleFlag::default(),
        }
    }
}
