//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! CRM entity bridge test suite.
//!
//! # Modules
//!
//! - `fixtures`: CRM field lists, translated schemas, timestamps and timezones
//! - `builders`: Builders for the mock CRM API and entity instances
//! - `assertions`: Custom assertion helpers for params, schemas and violations
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
