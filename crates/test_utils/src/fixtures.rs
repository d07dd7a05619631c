//! Pre-built Test Fixtures
//!
//! Field lists shaped like the CRM's `getfields` output for the entity types
//! the test suite exercises, plus the timestamps and timezones used by the
//! normalization tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use core_kernel::{EntityTypeId, Timezone};
use domain_schema::{
    Cardinality, CrmFieldDescriptor, EntityTypeSchema, FieldDefinitionProvider,
};

/// Fixture for CRM field descriptors
pub struct DescriptorFixtures;

impl DescriptorFixtures {
    /// Creatable fields of `Contact`, in API order
    pub fn contact_fields() -> Vec<CrmFieldDescriptor> {
        CONTACT_FIELDS.clone()
    }

    /// Creatable fields of `Activity`, in API order
    pub fn activity_fields() -> Vec<CrmFieldDescriptor> {
        ACTIVITY_FIELDS.clone()
    }

    /// Creatable fields of `Tag`, in API order
    pub fn tag_fields() -> Vec<CrmFieldDescriptor> {
        vec![
            descriptor("id", 1, "Tag ID"),
            CrmFieldDescriptor {
                required: true,
                max_length: Some(64),
                ..descriptor("name", 2, "Tag Name")
            },
            descriptor("description", 2, "Description"),
            descriptor("is_reserved", 16, "Reserved"),
        ]
    }

    /// A field with a type code the CRM API does not define
    pub fn unmapped_field() -> CrmFieldDescriptor {
        descriptor("legacy_blob", 8192, "Legacy Blob")
    }
}

static CONTACT_FIELDS: Lazy<Vec<CrmFieldDescriptor>> = Lazy::new(|| {
    vec![
        descriptor("id", 1, "Contact ID"),
        CrmFieldDescriptor {
            options: Some(options(&[
                ("Individual", "Individual"),
                ("Organization", "Organization"),
                ("Household", "Household"),
            ])),
            html_type: Some("Select".to_string()),
            ..descriptor("contact_type", 2, "Contact Type")
        },
        CrmFieldDescriptor {
            max_length: Some(128),
            ..descriptor("organization_name", 2, "Organization Name")
        },
        CrmFieldDescriptor {
            max_length: Some(64),
            ..descriptor("first_name", 2, "First Name")
        },
        CrmFieldDescriptor {
            max_length: Some(64),
            ..descriptor("last_name", 2, "Last Name")
        },
        descriptor("email", 2048, "Email Address"),
        descriptor("birth_date", 4, "Birth Date"),
        descriptor("do_not_email", 16, "Do Not Email"),
        CrmFieldDescriptor {
            fk_entity: Some("Contact".to_string()),
            ..descriptor("employer_id", 1, "Current Employer")
        },
        descriptor("home_url", 4096, "Website"),
    ]
});

static ACTIVITY_FIELDS: Lazy<Vec<CrmFieldDescriptor>> = Lazy::new(|| {
    vec![
        descriptor("id", 1, "Activity ID"),
        CrmFieldDescriptor {
            required: true,
            options: Some(options(&[("1", "Meeting"), ("2", "Phone Call"), ("3", "Email")])),
            ..descriptor("activity_type_id", 1, "Activity Type")
        },
        descriptor("subject", 2, "Subject"),
        descriptor("activity_date_time", 12, "Activity Date"),
        descriptor("duration", 1, "Duration"),
        CrmFieldDescriptor {
            cardinality: Cardinality::Unlimited,
            fk_entity: Some("Contact".to_string()),
            ..descriptor("assignee_contact_id", 1, "Assigned To")
        },
        descriptor("details", 32, "Details"),
    ]
});

fn descriptor(name: &str, api_type: u32, title: &str) -> CrmFieldDescriptor {
    CrmFieldDescriptor {
        title: Some(title.to_string()),
        ..CrmFieldDescriptor::new(name, api_type)
    }
}

fn options(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(key, label)| (key.to_string(), label.to_string()))
        .collect()
}

/// Fixture for schemas translated without going through the builder
pub struct SchemaFixtures;

impl SchemaFixtures {
    pub fn contact() -> Arc<EntityTypeSchema> {
        Arc::new(translate_all(
            "civicrm_contact",
            "Contact",
            "CiviCRM Contact",
            &DescriptorFixtures::contact_fields(),
        ))
    }

    pub fn activity() -> Arc<EntityTypeSchema> {
        Arc::new(translate_all(
            "civicrm_activity",
            "Activity",
            "CiviCRM Activity",
            &DescriptorFixtures::activity_fields(),
        ))
    }

    pub fn tag() -> Arc<EntityTypeSchema> {
        Arc::new(translate_all(
            "civicrm_tag",
            "Tag",
            "CiviCRM Tag",
            &DescriptorFixtures::tag_fields(),
        ))
    }
}

fn translate_all(
    id: &str,
    crm_entity: &str,
    label: &str,
    descriptors: &[CrmFieldDescriptor],
) -> EntityTypeSchema {
    let provider = FieldDefinitionProvider::default();
    let mut schema = EntityTypeSchema::new(EntityTypeId::new(id), crm_entity.into(), label);
    for descriptor in descriptors {
        if let Ok(definition) = provider.translate(descriptor) {
            schema.push(definition);
        }
    }
    schema
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 2024-03-10 15:00:00 UTC, hours after the US switched to daylight time
    pub fn dst_afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap()
    }

    /// 2024-01-15 15:00:00 UTC, US standard time
    pub fn winter_afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap()
    }

    pub fn new_york() -> Timezone {
        Timezone::new(chrono_tz::America::New_York)
    }

    pub fn utc() -> Timezone {
        Timezone::default()
    }
}
