//! Field-level violations

use serde::Serialize;

use core_kernel::ParamValue;

/// Where a violation was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationOrigin {
    /// Structural checks on the content side
    Local,
    /// The CRM's validate endpoint
    Crm,
}

/// A validation failure attached to one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<ParamValue>,
    pub origin: ViolationOrigin,
}

impl FieldViolation {
    pub fn local(
        field_name: impl Into<String>,
        message: impl Into<String>,
        invalid_value: Option<ParamValue>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
            invalid_value,
            origin: ViolationOrigin::Local,
        }
    }

    pub fn crm(
        field_name: impl Into<String>,
        message: impl Into<String>,
        invalid_value: Option<ParamValue>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
            invalid_value,
            origin: ViolationOrigin::Crm,
        }
    }
}

/// Ordered violations of one validation call; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViolationList(Vec<FieldViolation>);

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldViolation> {
        self.0.iter()
    }

    pub fn for_field<'a>(&'a self, field_name: &'a str) -> impl Iterator<Item = &'a FieldViolation> {
        self.0.iter().filter(move |v| v.field_name == field_name)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.message.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }
}

impl Extend<FieldViolation> for ViolationList {
    fn extend<I: IntoIterator<Item = FieldViolation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<FieldViolation> for ViolationList {
    fn from_iter<I: IntoIterator<Item = FieldViolation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ViolationList {
    type Item = FieldViolation;
    type IntoIter = std::vec::IntoIter<FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keeps_order_and_filters_by_field() {
        let mut list = ViolationList::new();
        assert!(list.is_valid());

        list.add(FieldViolation::local("email", "Email Address field is required.", None));
        list.extend(vec![
            FieldViolation::crm("contact_type", "Contact Type is invalid", None),
            FieldViolation::crm("email", "Email Address is invalid", None),
        ]);

        assert_eq!(list.len(), 3);
        assert_eq!(list.for_field("email").count(), 2);
        assert_eq!(list.messages()[1], "Contact Type is invalid");
    }

    #[test]
    fn test_serializes_as_array() {
        let list: ViolationList =
            std::iter::once(FieldViolation::crm("email", "Email Address is invalid", None)).collect();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "field_name": "email",
                "message": "Email Address is invalid",
                "origin": "crm"
            }])
        );
    }
}
