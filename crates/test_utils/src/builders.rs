//! Test Data Builders
//!
//! Builders for the mock CRM and for entity instances, so tests only spell
//! out the parts they care about.

use std::sync::Arc;

use core_kernel::FieldValue;
use domain_entity::{CrmEntity, FieldItem};
use domain_schema::{
    CrmFieldDescriptor, CrmViolation, CrmViolations, CustomFieldMetadata, EntityTypeSchema,
    InMemoryCrmApi,
};

use crate::fixtures::{DescriptorFixtures, SchemaFixtures};

/// Builder for a mock CRM API
///
/// Starts with the `Contact`, `Activity` and `Tag` field lists loaded.
pub struct TestCrmBuilder {
    api: InMemoryCrmApi,
}

impl Default for TestCrmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCrmBuilder {
    pub fn new() -> Self {
        Self {
            api: InMemoryCrmApi::new()
                .with_fields("Contact", DescriptorFixtures::contact_fields())
                .with_fields("Activity", DescriptorFixtures::activity_fields())
                .with_fields("Tag", DescriptorFixtures::tag_fields()),
        }
    }

    /// Replaces the field list of an entity
    pub fn with_fields(mut self, entity: &str, fields: Vec<CrmFieldDescriptor>) -> Self {
        self.api = self.api.with_fields(entity, fields);
        self
    }

    pub fn with_custom_metadata(mut self, field: &str, metadata: CustomFieldMetadata) -> Self {
        self.api = self.api.with_custom_metadata(field, metadata);
        self
    }

    /// Makes the CRM reject the given fields of an entity with these messages
    pub fn with_violation(self, entity: &str, field: &str, message: &str) -> Self {
        self.with_violations(entity, &[(field, message)])
    }

    pub fn with_violations(mut self, entity: &str, violations: &[(&str, &str)]) -> Self {
        let mut map = CrmViolations::new();
        for (field, message) in violations {
            map.entry(field.to_string())
                .or_default()
                .push(CrmViolation::new(*message));
        }
        self.api = self.api.with_violations(entity, map);
        self
    }

    pub fn build(self) -> InMemoryCrmApi {
        self.api
    }

    pub fn build_arc(self) -> Arc<InMemoryCrmApi> {
        Arc::new(self.api)
    }
}

/// Builder for entity instances
pub struct TestEntityBuilder {
    schema: Arc<EntityTypeSchema>,
    values: Vec<(String, Vec<FieldItem>)>,
    id: Option<i64>,
}

impl TestEntityBuilder {
    pub fn new(schema: Arc<EntityTypeSchema>) -> Self {
        Self {
            schema,
            values: Vec::new(),
            id: None,
        }
    }

    /// Contact of type Organization named "Acme Inc"
    pub fn organization() -> Self {
        Self::new(SchemaFixtures::contact())
            .with_value("contact_type", "Organization")
            .with_value("organization_name", "Acme Inc")
    }

    /// Meeting activity with a subject
    pub fn meeting() -> Self {
        Self::new(SchemaFixtures::activity())
            .with_value("activity_type_id", 1_i64)
            .with_value("subject", "Quarterly review")
    }

    pub fn tag(name: &str) -> Self {
        Self::new(SchemaFixtures::tag()).with_value("name", name)
    }

    /// Sets a field to one item holding `value` in its main property
    pub fn with_value(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with_values(field, vec![value.into()])
    }

    /// Sets a field to one item per value
    pub fn with_values<V: Into<FieldValue>>(mut self, field: &str, values: Vec<V>) -> Self {
        let main = self
            .schema
            .field(field)
            .map(|definition| definition.main_property())
            .unwrap_or("value");
        let items = values
            .into_iter()
            .map(|value| FieldItem::new().with(main, value))
            .collect();
        self.values.push((field.to_string(), items));
        self
    }

    /// Sets a field to raw items, including empty ones
    pub fn with_items(mut self, field: &str, items: Vec<FieldItem>) -> Self {
        self.values.push((field.to_string(), items));
        self
    }

    /// Marks the entity as already saved in the CRM
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Builds the entity
    ///
    /// # Panics
    ///
    /// Panics if a field is not part of the schema.
    pub fn build(self) -> CrmEntity {
        let mut entity = CrmEntity::new(self.schema);
        for (field, items) in self.values {
            entity
                .set(&field, items)
                .unwrap_or_else(|err| panic!("cannot set {field}: {err}"));
        }
        if let Some(id) = self.id {
            entity.set_id(id);
        }
        entity
    }
}
