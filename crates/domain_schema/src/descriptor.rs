//! CRM field descriptors
//!
//! A descriptor is one entry of the CRM API's `getfields` answer for an entity.
//! Descriptors are immutable inputs to a schema build; module-supplied
//! [`FieldOverride`]s are merged on top before translation.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of values a field may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Limited(u32),
    Unlimited,
}

impl Cardinality {
    pub const SINGLE: Cardinality = Cardinality::Limited(1);

    /// Returns true when the field holds exactly one value
    pub fn is_single(&self) -> bool {
        matches!(self, Cardinality::Limited(1))
    }

    /// Returns the limit, or None when unlimited
    pub fn limit(&self) -> Option<u32> {
        match self {
            Cardinality::Limited(n) => Some(*n),
            Cardinality::Unlimited => None,
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::SINGLE
    }
}

// Serialized as an integer, -1 meaning unlimited
impl Serialize for Cardinality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cardinality::Limited(n) => serializer.serialize_i64(i64::from(*n)),
            Cardinality::Unlimited => serializer.serialize_i64(-1),
        }
    }
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            -1 => Ok(Cardinality::Unlimited),
            n if n >= 1 && n <= i64::from(u32::MAX) => Ok(Cardinality::Limited(n as u32)),
            n => Err(serde::de::Error::custom(format!("Invalid cardinality: {}", n))),
        }
    }
}

/// CRM API data type codes
///
/// The codes are bit values; a date with a time component is reported as
/// `Date | Time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrmApiType {
    Int,
    String,
    Date,
    Time,
    DateTime,
    Boolean,
    Text,
    Blob,
    Timestamp,
    Float,
    Money,
    Email,
    Url,
    MediumBlob,
}

impl CrmApiType {
    /// Maps a raw type code, returning None for codes the bridge does not know
    pub fn from_code(code: u32) -> Option<Self> {
        let api_type = match code {
            1 => CrmApiType::Int,
            2 => CrmApiType::String,
            4 => CrmApiType::Date,
            8 => CrmApiType::Time,
            12 => CrmApiType::DateTime,
            16 => CrmApiType::Boolean,
            32 => CrmApiType::Text,
            64 => CrmApiType::Blob,
            256 => CrmApiType::Timestamp,
            512 => CrmApiType::Float,
            1024 => CrmApiType::Money,
            2048 => CrmApiType::Email,
            4096 => CrmApiType::Url,
            16384 => CrmApiType::MediumBlob,
            _ => return None,
        };
        Some(api_type)
    }

    pub fn code(&self) -> u32 {
        match self {
            CrmApiType::Int => 1,
            CrmApiType::String => 2,
            CrmApiType::Date => 4,
            CrmApiType::Time => 8,
            CrmApiType::DateTime => 12,
            CrmApiType::Boolean => 16,
            CrmApiType::Text => 32,
            CrmApiType::Blob => 64,
            CrmApiType::Timestamp => 256,
            CrmApiType::Float => 512,
            CrmApiType::Money => 1024,
            CrmApiType::Email => 2048,
            CrmApiType::Url => 4096,
            CrmApiType::MediumBlob => 16384,
        }
    }
}

/// Which API action a field list is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAction {
    Create,
}

impl FieldAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldAction::Create => "create",
        }
    }
}

/// One field as described by the CRM API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmFieldDescriptor {
    pub name: String,
    /// Raw CRM type code; see [`CrmApiType`]
    #[serde(rename = "type")]
    pub api_type: u32,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Option-list choices, key to label, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub required: bool,
    /// CRM entity a foreign-key field points at
    #[serde(default, alias = "FKApiName", skip_serializing_if = "Option::is_none")]
    pub fk_entity: Option<String>,
    #[serde(default, alias = "maxlength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_type: Option<String>,
    #[serde(default)]
    pub read_only: bool,
}

impl CrmFieldDescriptor {
    /// Creates a single-valued descriptor with only a name and type code
    pub fn new(name: impl Into<String>, api_type: u32) -> Self {
        Self {
            name: name.into(),
            api_type,
            cardinality: Cardinality::SINGLE,
            title: None,
            description: None,
            options: None,
            required: false,
            fk_entity: None,
            max_length: None,
            html_type: None,
            read_only: false,
        }
    }

    /// Human-readable label, falling back to the machine name
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn crm_type(&self) -> Option<CrmApiType> {
        CrmApiType::from_code(self.api_type)
    }

    pub fn has_options(&self) -> bool {
        self.options.as_ref().is_some_and(|o| !o.is_empty())
    }
}

/// Module-supplied partial descriptor
///
/// Every attribute that is set wins over the CRM's value; unset attributes
/// keep the CRM's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOverride {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub api_type: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl FieldOverride {
    /// Merges this override onto a base descriptor
    pub fn apply(&self, base: &CrmFieldDescriptor) -> CrmFieldDescriptor {
        CrmFieldDescriptor {
            name: base.name.clone(),
            api_type: self.api_type.unwrap_or(base.api_type),
            cardinality: self.cardinality.unwrap_or(base.cardinality),
            title: self.title.clone().or_else(|| base.title.clone()),
            description: self.description.clone().or_else(|| base.description.clone()),
            options: self.options.clone().or_else(|| base.options.clone()),
            required: self.required.unwrap_or(base.required),
            fk_entity: self.fk_entity.clone().or_else(|| base.fk_entity.clone()),
            max_length: self.max_length.or(base.max_length),
            html_type: self.html_type.clone().or_else(|| base.html_type.clone()),
            read_only: self.read_only.unwrap_or(base.read_only),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_serde() {
        let unlimited: Cardinality = serde_json::from_str("-1").unwrap();
        assert_eq!(unlimited, Cardinality::Unlimited);
        let three: Cardinality = serde_json::from_str("3").unwrap();
        assert_eq!(three.limit(), Some(3));
        assert!(serde_json::from_str::<Cardinality>("0").is_err());
        assert_eq!(serde_json::to_string(&Cardinality::Unlimited).unwrap(), "-1");
    }

    #[test]
    fn test_descriptor_from_getfields_json() {
        let json = r#"{
            "name": "contact_id",
            "title": "Contact",
            "type": 1,
            "FKApiName": "Contact",
            "required": true
        }"#;
        let descriptor: CrmFieldDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.crm_type(), Some(CrmApiType::Int));
        assert_eq!(descriptor.fk_entity.as_deref(), Some("Contact"));
        assert!(descriptor.cardinality.is_single());
        assert!(descriptor.required);
        assert_eq!(descriptor.label(), "Contact");
    }

    #[test]
    fn test_override_wins_and_base_fills_gaps() {
        let mut base = CrmFieldDescriptor::new("subject", 2);
        base.title = Some("Subject".to_string());
        base.max_length = Some(255);

        let over = FieldOverride {
            title: Some("Activity Subject".to_string()),
            required: Some(true),
            ..Default::default()
        };
        let merged = over.apply(&base);

        assert_eq!(merged.title.as_deref(), Some("Activity Subject"));
        assert!(merged.required);
        assert_eq!(merged.max_length, Some(255));
        assert_eq!(merged.api_type, 2);
    }

    #[test]
    fn test_type_codes_round_trip() {
        for code in [1, 2, 4, 8, 12, 16, 32, 64, 256, 512, 1024, 2048, 4096, 16384] {
            let api_type = CrmApiType::from_code(code).unwrap();
            assert_eq!(api_type.code(), code);
        }
        assert_eq!(CrmApiType::from_code(8192), None);
    }
}
