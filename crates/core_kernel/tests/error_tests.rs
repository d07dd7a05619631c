//! Tests for core_kernel error types

use core_kernel::{parse_storage_datetime, PortError, TemporalError, Timezone};

#[test]
fn test_invalid_timezone_names_the_input() {
    let error = Timezone::from_name("Nowhere/City").unwrap_err();

    assert!(matches!(
        error,
        TemporalError::InvalidTimezone(ref name) if name == "Nowhere/City"
    ));
    assert_eq!(error.to_string(), "Invalid timezone: Nowhere/City");
}

#[test]
fn test_unparseable_datetime_keeps_raw_value() {
    let error = parse_storage_datetime("next tuesday").unwrap_err();

    assert_eq!(error, TemporalError::UnparseableDateTime("next tuesday".to_string()));
}

#[test]
fn test_port_error_internal_has_no_source() {
    let error = PortError::internal("mock exhausted");
    assert!(std::error::Error::source(&error).is_none());
    assert!(!error.is_transient());
}

#[test]
fn test_port_error_service_unavailable_is_transient() {
    let error = PortError::ServiceUnavailable {
        service: "civicrm".to_string(),
    };
    assert!(error.is_transient());
    assert_eq!(error.to_string(), "Service unavailable: civicrm");
}

#[test]
fn test_port_error_connection_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
    let error = PortError::Connection {
        message: "civicrm REST endpoint".to_string(),
        source: Some(Box::new(io)),
    };

    assert!(error.is_transient());
    assert!(std::error::Error::source(&error).is_some());
}
