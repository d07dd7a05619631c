//! Custom Test Assertions
//!
//! Assertion helpers that print the offending parameters, schema, or
//! violations instead of a bare `assertion failed`.

use core_kernel::NormalizedParams;
use domain_entity::{CrmEntity, ViolationList, ViolationOrigin};
use domain_schema::EntityTypeSchema;

/// Asserts that no normalized parameter is empty
pub fn assert_no_empty_params(params: &NormalizedParams) {
    for (name, value) in params {
        assert!(
            !value.is_empty(),
            "Parameter {} is empty in {:?}",
            name,
            params
        );
    }
}

/// Asserts the schema's field names, in order
pub fn assert_field_order(schema: &EntityTypeSchema, expected: &[&str]) {
    let actual: Vec<&str> = schema.field_names().collect();
    assert_eq!(
        actual, expected,
        "Field order mismatch for {}",
        schema.entity_type_id
    );
}

/// Asserts that the entity's lifecycle flag is lowered
pub fn assert_lifecycle_idle(entity: &CrmEntity) {
    assert!(
        !entity.is_content_originated(),
        "Lifecycle flag of {} {} is still raised",
        entity.entity_type_id(),
        entity.uuid()
    );
}

/// Asserts that a violation with this field and message exists
pub fn assert_has_violation(violations: &ViolationList, field: &str, message: &str) {
    assert!(
        violations
            .for_field(field)
            .any(|violation| violation.message == message),
        "No violation {:?} on field {}; got {:?}",
        message,
        field,
        violations.messages()
    );
}

/// Asserts that every violation came from the given origin
pub fn assert_all_from(violations: &ViolationList, origin: ViolationOrigin) {
    for violation in violations {
        assert_eq!(
            violation.origin, origin,
            "Unexpected origin for violation on {}: {}",
            violation.field_name, violation.message
        );
    }
}
