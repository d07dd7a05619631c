//! Field values and CRM API parameters
//!
//! `FieldValue` is the scalar (or composite) value stored in one property of a
//! content field item. `ParamValue` is what the CRM API receives for one field
//! after normalization: either a bare scalar or an ordered list of scalars.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::temporal::STORAGE_DATETIME_FORMAT;

/// A single property value held by a content field item
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
    /// Date without a time component
    Date(NaiveDate),
    /// Timezone-aware instant, always held in UTC
    DateTime(DateTime<Utc>),
    /// Composite value; never unwrapped or converted
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns true for null, empty strings, and empty lists
    ///
    /// `false` and `0` are real values and are not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Renders the value as it would appear in an option-list key
    pub fn to_key(&self) -> Option<String> {
        match self {
            FieldValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Decimal(d) => Some(d.to_string()),
            FieldValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Decimal(d) => Serialize::serialize(d, serializer),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => {
                serializer.serialize_str(&dt.format(STORAGE_DATETIME_FORMAT).to_string())
            }
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Value of one CRM API parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Single-cardinality field, unwrapped
    Single(FieldValue),
    /// Multi-valued field, ordered by delta
    Multiple(Vec<FieldValue>),
}

impl ParamValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty(),
            ParamValue::Multiple(values) => values.is_empty(),
        }
    }

    /// Returns the bare scalar of a single-valued parameter
    pub fn as_single(&self) -> Option<&FieldValue> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Multiple(_) => None,
        }
    }
}

/// Flat CRM API parameters keyed by CRM field name, in field order
pub type NormalizedParams = IndexMap<String, ParamValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_values() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert!(!FieldValue::from("0").is_empty());
    }

    #[test]
    fn test_serialize_scalars() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        assert_eq!(serde_json::to_value(FieldValue::from(dt)).unwrap(), "2024-03-10T15:00:00");
        assert_eq!(serde_json::to_value(FieldValue::from(42_i64)).unwrap(), 42);
        assert_eq!(serde_json::to_value(FieldValue::Null).unwrap(), serde_json::Value::Null);
        assert_eq!(
            serde_json::to_value(FieldValue::from(vec!["a", "b"])).unwrap(),
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn test_decimal_serializes_as_exact_string() {
        assert_eq!(
            serde_json::to_value(FieldValue::from(dec!(1250.50))).unwrap(),
            serde_json::json!("1250.50")
        );
    }

    #[test]
    fn test_param_value_serializes_untagged() {
        let single = ParamValue::Single(FieldValue::from("Acme Inc"));
        let multiple = ParamValue::Multiple(vec![FieldValue::from(1_i64), FieldValue::from(2_i64)]);
        assert_eq!(serde_json::to_value(&single).unwrap(), "Acme Inc");
        assert_eq!(serde_json::to_value(&multiple).unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn test_to_key() {
        assert_eq!(FieldValue::Integer(3).to_key(), Some("3".to_string()));
        assert_eq!(FieldValue::Bool(true).to_key(), Some("1".to_string()));
        assert_eq!(FieldValue::from(dec!(1.50)).to_key(), Some("1.50".to_string()));
        assert_eq!(FieldValue::Null.to_key(), None);
    }
}
