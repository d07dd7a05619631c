//! Tests for value normalization

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{FieldValue, ParamValue, Timezone};
use domain_entity::{FieldItem, ValueNormalizer};
use domain_schema::{EntityFieldDefinition, FieldType};

use test_utils::{
    assert_no_empty_params, field_items_strategy, mixed_schema, SchemaFixtures,
    TemporalFixtures, TestEntityBuilder,
};

// ============================================================================
// Cardinality
// ============================================================================

mod cardinality_tests {
    use super::*;

    #[test]
    fn test_single_value_unwrapped_to_bare_scalar() {
        let entity = TestEntityBuilder::organization().build();
        let params = ValueNormalizer::default().normalize(&entity);

        assert_eq!(
            params.get("organization_name"),
            Some(&ParamValue::Single(FieldValue::from("Acme Inc")))
        );
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["organization_name"], "Acme Inc");
    }

    #[test]
    fn test_single_field_without_values_is_absent() {
        let entity = TestEntityBuilder::new(SchemaFixtures::contact())
            .with_value("contact_type", "Organization")
            .with_items("organization_name", vec![FieldItem::value(""), FieldItem::new()])
            .build();
        let params = ValueNormalizer::default().normalize(&entity);

        assert!(!params.contains_key("organization_name"));
        assert!(params.contains_key("contact_type"));
    }

    #[test]
    fn test_multi_valued_reference_keeps_order_and_drops_empty_items() {
        let entity = TestEntityBuilder::meeting()
            .with_items(
                "assignee_contact_id",
                vec![FieldItem::target(5), FieldItem::new(), FieldItem::target(2)],
            )
            .build();
        let params = ValueNormalizer::default().normalize(&entity);

        assert_eq!(
            params.get("assignee_contact_id"),
            Some(&ParamValue::Multiple(vec![FieldValue::Integer(5), FieldValue::Integer(2)]))
        );
    }

    #[test]
    fn test_params_follow_schema_order() {
        let entity = TestEntityBuilder::organization()
            .with_value("email", "info@acme.example")
            .with_id(8)
            .build();
        let params = ValueNormalizer::default().normalize(&entity);

        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "contact_type", "organization_name", "email"]);
    }
}

// ============================================================================
// Date/time conversion
// ============================================================================

mod datetime_tests {
    use super::*;

    #[test]
    fn test_utc_converted_to_new_york_during_dst() {
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", TemporalFixtures::dst_afternoon())
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::new_york()).normalize(&entity);

        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single(FieldValue::from("2024-03-10 11:00:00")))
        );
    }

    #[test]
    fn test_utc_converted_to_new_york_in_winter() {
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", TemporalFixtures::winter_afternoon())
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::new_york()).normalize(&entity);

        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single(FieldValue::from("2024-01-15 10:00:00")))
        );
    }

    #[test]
    fn test_utc_display_timezone_only_reformats() {
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", "2024-03-10T15:00:00")
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::utc()).normalize(&entity);

        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single(FieldValue::from("2024-03-10 15:00:00")))
        );
    }

    #[test]
    fn test_date_only_field_not_converted() {
        let birth_date = NaiveDate::from_ymd_opt(1990, 7, 4).unwrap();
        let entity = TestEntityBuilder::organization()
            .with_value("birth_date", birth_date)
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::new_york()).normalize(&entity);

        assert_eq!(params.get("birth_date"), Some(&ParamValue::Single(FieldValue::Date(birth_date))));
    }

    // Composite datetime values are passed through without conversion.
    #[test]
    fn test_composite_datetime_value_not_converted() {
        let composite = FieldValue::List(vec![FieldValue::from(TemporalFixtures::dst_afternoon())]);
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", composite.clone())
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::new_york()).normalize(&entity);

        assert_eq!(params.get("activity_date_time"), Some(&ParamValue::Single(composite)));
    }

    #[test]
    fn test_display_timezone_is_configurable() {
        let normalizer = ValueNormalizer::new(Timezone::from_name("Asia/Tokyo").unwrap());
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", TemporalFixtures::dst_afternoon())
            .build();

        assert_eq!(
            normalizer.normalize(&entity).get("activity_date_time"),
            Some(&ParamValue::Single(FieldValue::from("2024-03-11 00:00:00")))
        );
    }
}

// ============================================================================
// Field selection
// ============================================================================

mod selection_tests {
    use super::*;

    #[test]
    fn test_configurable_fields_not_sent() {
        let mut entity = TestEntityBuilder::organization().build();
        entity
            .attach_field(EntityFieldDefinition::new("field_notes", FieldType::TextLong, "Notes"))
            .unwrap();
        entity.set_value("field_notes", "Met at the gala").unwrap();

        let params = ValueNormalizer::default().normalize(&entity);
        assert!(!params.contains_key("field_notes"));
        assert!(params.contains_key("organization_name"));
    }

    #[test]
    fn test_false_and_zero_are_sent() {
        let entity = TestEntityBuilder::organization()
            .with_value("do_not_email", false)
            .build();
        let params = ValueNormalizer::default().normalize(&entity);

        assert_eq!(params.get("do_not_email"), Some(&ParamValue::Single(FieldValue::Bool(false))));
    }

    #[test]
    fn test_normalize_is_deterministic_and_read_only() {
        let entity = TestEntityBuilder::meeting()
            .with_value("activity_date_time", TemporalFixtures::dst_afternoon())
            .with_values("assignee_contact_id", vec![3_i64, 4])
            .build();
        let before = entity.clone();
        let normalizer = ValueNormalizer::new(TemporalFixtures::new_york());

        assert_eq!(normalizer.normalize(&entity), normalizer.normalize(&entity));
        for field in before.fields() {
            assert_eq!(entity.get(field.name), field.items);
        }
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    #[test]
    fn normalized_params_are_never_empty(
        single in field_items_strategy(),
        multiple in field_items_strategy(),
        limited in field_items_strategy(),
        moment in field_items_strategy(),
    ) {
        let entity = TestEntityBuilder::new(mixed_schema())
            .with_items("single", single)
            .with_items("multiple", multiple)
            .with_items("limited", limited)
            .with_items("moment", moment)
            .build();
        let params = ValueNormalizer::new(TemporalFixtures::new_york()).normalize(&entity);

        assert_no_empty_params(&params);
        for field in entity.fields() {
            let has_values = field.main_values().next().is_some();
            prop_assert_eq!(params.contains_key(field.name), has_values);
            if let Some(param) = params.get(field.name) {
                prop_assert_eq!(
                    matches!(param, ParamValue::Single(_)),
                    field.definition.cardinality.is_single()
                );
            }
        }
    }
}
