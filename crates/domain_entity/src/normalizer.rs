//! Value Normalizer
//!
//! Flattens an entity's field values into the parameter shape the CRM API
//! expects. Only base, stored fields are sent; configurable fields and
//! computed fields stay on the content side.

use tracing::{debug, warn};

use core_kernel::{parse_storage_datetime, FieldValue, NormalizedParams, ParamValue, Timezone};

use crate::entity::{CrmEntity, FieldRef};

/// Converts entity field values into CRM API parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueNormalizer {
    display_timezone: Timezone,
}

impl ValueNormalizer {
    pub fn new(display_timezone: Timezone) -> Self {
        Self { display_timezone }
    }

    pub fn display_timezone(&self) -> Timezone {
        self.display_timezone
    }

    /// Builds the CRM parameters for the entity's current state
    ///
    /// Never fails: a datetime that cannot be parsed is passed through as is.
    pub fn normalize(&self, entity: &CrmEntity) -> NormalizedParams {
        let mut params = NormalizedParams::new();

        for field in entity.fields() {
            if !field.is_base || field.definition.computed {
                continue;
            }
            if let Some(value) = self.normalize_field(&field) {
                params.insert(field.name.to_string(), value);
            }
        }

        debug!(
            entity_type = %entity.entity_type_id(),
            params = params.len(),
            "Normalized entity values"
        );
        params
    }

    fn normalize_field(&self, field: &FieldRef<'_>) -> Option<ParamValue> {
        // Multi-valued datetimes go to the CRM as stored
        let convert =
            field.definition.is_timezone_aware() && field.definition.cardinality.is_single();
        let mut values: Vec<FieldValue> = field
            .main_values()
            .map(|value| {
                if convert {
                    self.convert_datetime(field.name, value)
                } else {
                    value.clone()
                }
            })
            .collect();

        let param = if field.definition.cardinality.is_single() {
            if values.is_empty() {
                return None;
            }
            ParamValue::Single(values.swap_remove(0))
        } else {
            ParamValue::Multiple(values)
        };

        (!param.is_empty()).then_some(param)
    }

    /// Stored UTC instant to display-timezone wall clock; lists are left alone
    fn convert_datetime(&self, field: &str, value: &FieldValue) -> FieldValue {
        match value {
            FieldValue::DateTime(utc) => FieldValue::String(self.display_timezone.format_for_crm(*utc)),
            FieldValue::String(raw) => match parse_storage_datetime(raw) {
                Ok(utc) => FieldValue::String(self.display_timezone.format_for_crm(utc)),
                Err(err) => {
                    warn!(field, error = %err, "Passing through unparseable datetime");
                    value.clone()
                }
            },
            _ => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use core_kernel::{CrmEntityName, EntityTypeId};
    use domain_schema::definition::{DATETIME_TYPE_DATETIME, SETTING_DATETIME_TYPE};
    use domain_schema::{Cardinality, EntityFieldDefinition, EntityTypeSchema, FieldType};

    fn activity_schema() -> Arc<EntityTypeSchema> {
        let mut schema = EntityTypeSchema::new(
            EntityTypeId::new("civicrm_activity"),
            CrmEntityName::new("Activity"),
            "CiviCRM Activity",
        );
        schema.push(EntityFieldDefinition::new("subject", FieldType::String, "Subject"));
        schema.push(
            EntityFieldDefinition::new("activity_date_time", FieldType::Datetime, "Date")
                .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATETIME),
        );
        schema.push(
            EntityFieldDefinition::new("assignee_id", FieldType::EntityReference, "Assignees")
                .with_cardinality(Cardinality::Unlimited),
        );
        let mut end = EntityFieldDefinition::new("activity_end_datetime", FieldType::Datetime, "End")
            .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATETIME);
        end.computed = true;
        schema.push(end);
        Arc::new(schema)
    }

    fn new_york() -> ValueNormalizer {
        ValueNormalizer::new(Timezone::from_name("America/New_York").unwrap())
    }

    #[test]
    fn test_single_cardinality_unwraps() {
        let mut entity = CrmEntity::new(activity_schema());
        entity.set_value("subject", "Follow up").unwrap();

        let params = ValueNormalizer::default().normalize(&entity);
        assert_eq!(params.get("subject"), Some(&ParamValue::Single("Follow up".into())));
    }

    #[test]
    fn test_multiple_cardinality_keeps_delta_order() {
        let mut entity = CrmEntity::new(activity_schema());
        entity.set_values("assignee_id", vec![7_i64, 3, 11]).unwrap();

        let params = ValueNormalizer::default().normalize(&entity);
        assert_eq!(
            params.get("assignee_id"),
            Some(&ParamValue::Multiple(vec![7_i64.into(), 3_i64.into(), 11_i64.into()]))
        );
    }

    #[test]
    fn test_datetime_converted_to_display_timezone() {
        let mut entity = CrmEntity::new(activity_schema());
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        entity.set_value("activity_date_time", utc).unwrap();

        let params = new_york().normalize(&entity);
        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single("2024-03-10 11:00:00".into()))
        );
    }

    #[test]
    fn test_stored_datetime_string_converted() {
        let mut entity = CrmEntity::new(activity_schema());
        entity.set_value("activity_date_time", "2024-03-10T15:00:00").unwrap();

        let params = new_york().normalize(&entity);
        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single("2024-03-10 11:00:00".into()))
        );
    }

    #[test]
    fn test_unparseable_datetime_passes_through() {
        let mut entity = CrmEntity::new(activity_schema());
        entity.set_value("activity_date_time", "next tuesday").unwrap();

        let params = new_york().normalize(&entity);
        assert_eq!(
            params.get("activity_date_time"),
            Some(&ParamValue::Single("next tuesday".into()))
        );
    }

    #[test]
    fn test_multi_valued_datetime_not_converted() {
        let mut schema = EntityTypeSchema::new(
            EntityTypeId::new("civicrm_event"),
            CrmEntityName::new("Event"),
            "CiviCRM Event",
        );
        schema.push(
            EntityFieldDefinition::new("session_dates", FieldType::Datetime, "Sessions")
                .with_setting(SETTING_DATETIME_TYPE, DATETIME_TYPE_DATETIME)
                .with_cardinality(Cardinality::Unlimited),
        );
        let mut entity = CrmEntity::new(Arc::new(schema));
        let first = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 3, 11, 15, 0, 0).unwrap();
        entity.set_values("session_dates", vec![first, second]).unwrap();

        let params = new_york().normalize(&entity);
        assert_eq!(
            params.get("session_dates"),
            Some(&ParamValue::Multiple(vec![first.into(), second.into()]))
        );
    }

    #[test]
    fn test_computed_field_not_sent() {
        let mut entity = CrmEntity::new(activity_schema());
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 16, 0, 0).unwrap();
        entity.set_value("activity_end_datetime", utc).unwrap();

        assert!(new_york().normalize(&entity).is_empty());
    }
}
