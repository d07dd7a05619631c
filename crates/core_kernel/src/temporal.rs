//! Timezone handling for date/time values crossing the bridge
//!
//! The content store keeps date/time values in UTC using the
//! `YYYY-MM-DDTHH:MM:SS` storage format. The CRM API expects wall-clock
//! values in the site's display timezone formatted as `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use std::str::FromStr;

/// Storage format of timezone-aware date/time values on the content side
pub const STORAGE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date/time format the CRM API accepts
pub const CRM_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unparseable date/time value: {0}")]
    UnparseableDateTime(String),
}

/// Timezone wrapper for the display timezone
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::from_name(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name such as `America/New_York`
    pub fn from_name(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Formats a UTC instant as local wall-clock time in the CRM format
    pub fn format_for_crm(&self, utc: DateTime<Utc>) -> String {
        self.to_local(utc).format(CRM_DATETIME_FORMAT).to_string()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Parses a stored `YYYY-MM-DDTHH:MM:SS` value as a UTC instant
///
/// RFC 3339 strings with an explicit offset are accepted as well.
pub fn parse_storage_datetime(value: &str) -> Result<DateTime<Utc>, TemporalError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, STORAGE_DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TemporalError::UnparseableDateTime(value.to_string()))
}
