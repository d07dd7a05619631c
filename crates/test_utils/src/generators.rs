//! Property-Based Test Generators
//!
//! Provides proptest strategies for CRM descriptors and content field values.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{CrmEntityName, EntityTypeId, FieldValue};
use domain_entity::FieldItem;
use domain_schema::{
    Cardinality, CrmFieldDescriptor, EntityFieldDefinition, EntityTypeSchema, FieldType,
};

/// Every CRM type code the provider translates
pub const MAPPED_TYPE_CODES: &[u32] = &[1, 2, 4, 8, 12, 16, 32, 64, 256, 512, 1024, 2048, 4096, 16384];

/// Strategy for recognized CRM type codes
pub fn mapped_type_code_strategy() -> impl Strategy<Value = u32> {
    proptest::sample::select(MAPPED_TYPE_CODES)
}

/// Strategy for type codes no CRM type uses
pub fn unmapped_type_code_strategy() -> impl Strategy<Value = u32> {
    any::<u32>().prop_filter("must not be a mapped code", |code| {
        !MAPPED_TYPE_CODES.contains(code)
    })
}

/// Strategy for cardinalities, weighted towards single-valued fields
pub fn cardinality_strategy() -> impl Strategy<Value = Cardinality> {
    prop_oneof![
        3 => Just(Cardinality::SINGLE),
        1 => Just(Cardinality::Unlimited),
        1 => (2u32..10).prop_map(Cardinality::Limited),
    ]
}

/// Strategy for CRM field machine names, `id` included
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("id".to_string()),
        9 => "[a-z][a-z_]{1,20}",
    ]
}

/// Strategy for descriptors with a recognized type and optional extras
pub fn descriptor_strategy() -> impl Strategy<Value = CrmFieldDescriptor> {
    (
        field_name_strategy(),
        mapped_type_code_strategy(),
        cardinality_strategy(),
        proptest::option::of("[A-Z][a-z]{2,12}( [A-Z][a-z]{2,12})?"),
        any::<bool>(),
    )
        .prop_map(|(name, api_type, cardinality, title, required)| CrmFieldDescriptor {
            cardinality,
            title,
            required,
            ..CrmFieldDescriptor::new(name, api_type)
        })
}

/// Strategy for UTC instants between 2000 and 2037
pub fn utc_datetime_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..2_145_916_800i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

/// Strategy for scalar field values, empty ones included
pub fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        Just(FieldValue::String(String::new())),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Integer),
        (any::<i64>(), 0u32..6).prop_map(|(m, s)| FieldValue::Decimal(Decimal::new(m, s))),
        "[ -~]{0,24}".prop_map(FieldValue::String),
        utc_datetime_strategy().prop_map(FieldValue::DateTime),
    ]
}

/// Strategy for field item lists of up to four items
pub fn field_items_strategy() -> impl Strategy<Value = Vec<FieldItem>> {
    proptest::collection::vec(
        prop_oneof![
            4 => field_value_strategy().prop_map(FieldItem::value),
            1 => Just(FieldItem::new()),
        ],
        0..4,
    )
}

/// A schema with one field per storage shape the normalizer distinguishes
pub fn mixed_schema() -> Arc<EntityTypeSchema> {
    let mut schema = EntityTypeSchema::new(
        EntityTypeId::new("civicrm_contact"),
        CrmEntityName::new("Contact"),
        "CiviCRM Contact",
    );
    schema.push(EntityFieldDefinition::new("single", FieldType::String, "Single"));
    schema.push(
        EntityFieldDefinition::new("multiple", FieldType::String, "Multiple")
            .with_cardinality(Cardinality::Unlimited),
    );
    schema.push(
        EntityFieldDefinition::new("limited", FieldType::Integer, "Limited")
            .with_cardinality(Cardinality::Limited(3)),
    );
    schema.push(
        EntityFieldDefinition::new("moment", FieldType::Datetime, "Moment")
            .with_setting("datetime_type", "datetime"),
    );
    Arc::new(schema)
}
