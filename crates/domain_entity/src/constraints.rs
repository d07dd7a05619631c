//! Local field constraints
//!
//! Structural checks run on the content side before the CRM is asked:
//!
//! - required fields must hold a non-empty value (read-only fields exempt)
//! - limited cardinality may not be exceeded
//! - option-list values must be one of the allowed keys
//! - strings may not exceed `max_length`
//! - emails and URLs must be well formed
//! - entity references must point at a positive id
//!
//! Computed fields are never checked.

use validator::{ValidateEmail, ValidateUrl};

use core_kernel::{FieldValue, ParamValue};
use domain_schema::FieldType;

use crate::entity::{CrmEntity, FieldRef};
use crate::violation::{FieldViolation, ViolationList};

/// Runs the local constraints of every field on an entity
pub struct LocalValidator;

impl LocalValidator {
    /// Validates the entity's current values
    ///
    /// Never mutates the entity. An empty list means every constraint holds.
    pub fn validate(entity: &CrmEntity) -> ViolationList {
        let mut violations = ViolationList::new();

        for field in entity.fields() {
            if field.definition.computed {
                continue;
            }
            Self::validate_required(&field, &mut violations);
            Self::validate_cardinality(&field, &mut violations);
            for value in field.main_values() {
                Self::validate_value(&field, value, &mut violations);
            }
        }

        violations
    }

    fn validate_required(field: &FieldRef<'_>, violations: &mut ViolationList) {
        let definition = field.definition;
        if definition.required && !definition.read_only && field.main_values().next().is_none() {
            violations.add(FieldViolation::local(
                field.name,
                format!("{} field is required.", definition.label),
                None,
            ));
        }
    }

    fn validate_cardinality(field: &FieldRef<'_>, violations: &mut ViolationList) {
        let Some(limit) = field.definition.cardinality.limit() else {
            return;
        };
        let values: Vec<FieldValue> = field.main_values().cloned().collect();
        if values.len() > limit as usize {
            violations.add(FieldViolation::local(
                field.name,
                format!("{}: this field cannot hold more than {} values.", field.definition.label, limit),
                Some(ParamValue::Multiple(values)),
            ));
        }
    }

    fn validate_value(field: &FieldRef<'_>, value: &FieldValue, violations: &mut ViolationList) {
        let definition = field.definition;
        let mut reject = |message: String| {
            violations.add(FieldViolation::local(
                field.name,
                message,
                Some(ParamValue::Single(value.clone())),
            ));
        };

        if let Some(allowed) = definition.allowed_values() {
            let key = value.to_key();
            if !key.is_some_and(|key| allowed.contains(&key.as_str())) {
                reject("The value you selected is not a valid choice.".to_string());
            }
        }

        if let (Some(max), Some(text)) = (definition.max_length(), value.as_str()) {
            let length = text.chars().count() as u64;
            if length > max {
                reject(format!(
                    "{}: may not be longer than {} characters.",
                    definition.label, max
                ));
            }
        }

        match definition.field_type {
            FieldType::Email => {
                if !matches!(value, FieldValue::String(email) if email.validate_email()) {
                    reject(format!("{} is not a valid email address.", display(value)));
                }
            }
            FieldType::Uri => {
                if !matches!(value, FieldValue::String(url) if url.validate_url()) {
                    reject(format!("The URL {} is not valid.", display(value)));
                }
            }
            FieldType::EntityReference => {
                if !value.as_i64().is_some_and(|id| id > 0) {
                    reject(format!(
                        "{}: the referenced entity ({}) does not exist.",
                        definition.label,
                        display(value)
                    ));
                }
            }
            _ => {}
        }
    }
}

fn display(value: &FieldValue) -> String {
    value
        .to_key()
        .unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use core_kernel::{CrmEntityName, EntityTypeId};
    use domain_schema::definition::{SETTING_ALLOWED_VALUES, SETTING_MAX_LENGTH};
    use domain_schema::{Cardinality, EntityFieldDefinition, EntityTypeSchema};
    use serde_json::json;

    use crate::entity::FieldItem;

    fn contact_schema() -> Arc<EntityTypeSchema> {
        let mut schema = EntityTypeSchema::new(
            EntityTypeId::new("civicrm_contact"),
            CrmEntityName::new("Contact"),
            "CiviCRM Contact",
        );
        let mut id = EntityFieldDefinition::new("id", FieldType::Integer, "Contact ID")
            .with_required(true);
        id.read_only = true;
        schema.push(id);
        schema.push(
            EntityFieldDefinition::new("contact_type", FieldType::ListString, "Contact Type")
                .with_required(true)
                .with_setting(
                    SETTING_ALLOWED_VALUES,
                    json!([
                        {"value": "Individual", "label": "Individual"},
                        {"value": "Organization", "label": "Organization"}
                    ]),
                ),
        );
        schema.push(
            EntityFieldDefinition::new("nick_name", FieldType::String, "Nickname")
                .with_setting(SETTING_MAX_LENGTH, 8),
        );
        schema.push(EntityFieldDefinition::new("email", FieldType::Email, "Email Address"));
        schema.push(EntityFieldDefinition::new("home_url", FieldType::Uri, "Website"));
        schema.push(
            EntityFieldDefinition::new("tags", FieldType::EntityReference, "Tags")
                .with_cardinality(Cardinality::Limited(2)),
        );
        Arc::new(schema)
    }

    fn valid_contact() -> CrmEntity {
        let mut entity = CrmEntity::new(contact_schema());
        entity.set_value("contact_type", "Organization").unwrap();
        entity
    }

    #[test]
    fn test_valid_entity_has_no_violations() {
        let mut entity = valid_contact();
        entity.set_value("email", "info@acme.example").unwrap();
        entity.set_value("home_url", "https://acme.example").unwrap();
        entity.set_values("tags", vec![4_i64, 9]).unwrap();

        assert!(LocalValidator::validate(&entity).is_valid());
    }

    #[test]
    fn test_required_field_missing() {
        let entity = CrmEntity::new(contact_schema());
        let violations = LocalValidator::validate(&entity);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.messages(), vec!["Contact Type field is required."]);
    }

    #[test]
    fn test_empty_items_count_as_missing() {
        let mut entity = CrmEntity::new(contact_schema());
        entity
            .set("contact_type", vec![FieldItem::value(""), FieldItem::new()])
            .unwrap();

        let violations = LocalValidator::validate(&entity);
        assert_eq!(violations.for_field("contact_type").count(), 1);
    }

    #[test]
    fn test_option_outside_allowed_values() {
        let mut entity = CrmEntity::new(contact_schema());
        entity.set_value("contact_type", "Household").unwrap();

        let violations = LocalValidator::validate(&entity);
        let violation = violations.iter().next().unwrap();
        assert_eq!(violation.message, "The value you selected is not a valid choice.");
        assert_eq!(violation.invalid_value, Some(ParamValue::Single("Household".into())));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let mut entity = valid_contact();
        entity.set_value("nick_name", "Zoë Acme").unwrap();
        assert!(LocalValidator::validate(&entity).is_valid());

        entity.set_value("nick_name", "Acme Holdings").unwrap();
        assert_eq!(
            LocalValidator::validate(&entity).messages(),
            vec!["Nickname: may not be longer than 8 characters."]
        );
    }

    #[test]
    fn test_malformed_email_and_url() {
        let mut entity = valid_contact();
        entity.set_value("email", "not-an-email").unwrap();
        entity.set_value("home_url", "acme dot example").unwrap();

        let violations = LocalValidator::validate(&entity);
        assert_eq!(
            violations.messages(),
            vec![
                "not-an-email is not a valid email address.",
                "The URL acme dot example is not valid.",
            ]
        );
    }

    #[test]
    fn test_cardinality_and_reference_targets() {
        let mut entity = valid_contact();
        entity.set_values("tags", vec![1_i64, 0, 3]).unwrap();

        let violations = LocalValidator::validate(&entity);
        let messages = violations.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Tags: this field cannot hold more than 2 values.");
        assert_eq!(messages[1], "Tags: the referenced entity (0) does not exist.");
    }
}
