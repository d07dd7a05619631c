//! CRM entity types the bridge can expose as content entities
//!
//! Which of these are actually enabled is decided by the admin layer; the
//! bridge only needs the mapping between content-side ids and CRM names.

use core_kernel::{CrmEntityName, EntityTypeId};

/// CRM entity name of the activity-like type with start/duration semantics
pub const ACTIVITY_ENTITY: &str = "Activity";

const SUPPORTED: &[(&str, &str, &str)] = &[
    ("civicrm_activity", "Activity", "CiviCRM Activity"),
    ("civicrm_address", "Address", "CiviCRM Address"),
    ("civicrm_campaign", "Campaign", "CiviCRM Campaign"),
    ("civicrm_case", "Case", "CiviCRM Case"),
    ("civicrm_contact", "Contact", "CiviCRM Contact"),
    ("civicrm_contribution", "Contribution", "CiviCRM Contribution"),
    ("civicrm_email", "Email", "CiviCRM Email"),
    ("civicrm_event", "Event", "CiviCRM Event"),
    ("civicrm_group", "Group", "CiviCRM Group"),
    ("civicrm_membership", "Membership", "CiviCRM Membership"),
    ("civicrm_note", "Note", "CiviCRM Note"),
    ("civicrm_participant", "Participant", "CiviCRM Participant"),
    ("civicrm_phone", "Phone", "CiviCRM Phone"),
    ("civicrm_relationship", "Relationship", "CiviCRM Relationship"),
    ("civicrm_tag", "Tag", "CiviCRM Tag"),
];

/// One exposable entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedEntityType {
    pub id: EntityTypeId,
    pub crm_entity: CrmEntityName,
    pub label: String,
}

impl SupportedEntityType {
    pub fn new(id: impl Into<String>, crm_entity: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: EntityTypeId::new(id),
            crm_entity: CrmEntityName::new(crm_entity),
            label: label.into(),
        }
    }

    /// Whether the type gets the synthetic end date/time field
    pub fn is_activity(&self) -> bool {
        self.crm_entity.as_str() == ACTIVITY_ENTITY
    }
}

/// Registry of exposable entity types
#[derive(Debug, Clone)]
pub struct SupportedEntityTypes {
    types: Vec<SupportedEntityType>,
}

impl SupportedEntityTypes {
    pub fn new(types: Vec<SupportedEntityType>) -> Self {
        Self { types }
    }

    /// Adds or replaces an entry
    pub fn register(&mut self, entity_type: SupportedEntityType) {
        self.types.retain(|t| t.id != entity_type.id);
        self.types.push(entity_type);
    }

    pub fn get(&self, id: &EntityTypeId) -> Option<&SupportedEntityType> {
        self.types.iter().find(|t| &t.id == id)
    }

    /// Looks up the content-side type for a CRM entity name
    pub fn by_crm_entity(&self, crm_entity: &str) -> Option<&SupportedEntityType> {
        self.types.iter().find(|t| t.crm_entity.as_str() == crm_entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupportedEntityType> {
        self.types.iter()
    }
}

impl Default for SupportedEntityTypes {
    fn default() -> Self {
        Self::new(
            SUPPORTED
                .iter()
                .map(|(id, crm, label)| SupportedEntityType::new(*id, *crm, *label))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_directions() {
        let supported = SupportedEntityTypes::default();
        let contact = supported.get(&EntityTypeId::new("civicrm_contact")).unwrap();
        assert_eq!(contact.crm_entity.as_str(), "Contact");
        assert!(!contact.is_activity());

        let activity = supported.by_crm_entity("Activity").unwrap();
        assert_eq!(activity.id.as_str(), "civicrm_activity");
        assert!(activity.is_activity());

        assert!(supported.get(&EntityTypeId::new("civicrm_widget")).is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut supported = SupportedEntityTypes::default();
        let before = supported.iter().count();
        supported.register(SupportedEntityType::new("civicrm_tag", "Tag", "Label"));
        supported.register(SupportedEntityType::new("civicrm_grant", "Grant", "CiviCRM Grant"));

        assert_eq!(supported.iter().count(), before + 1);
        assert_eq!(supported.get(&EntityTypeId::new("civicrm_tag")).unwrap().label, "Label");
    }
}
