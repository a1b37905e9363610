//! # spmgen-schema: Partition Manifest Schema Validation
//!
//! First stage of the manifest pipeline. Every document is checked
//! against the fixed partition schema before any model field is read.
//!
//! ## Runtime Validation (`validate`)
//!
//! - [`SchemaValidator::partition`]: the embedded
//!   `schemas/partition.schema.json`, compiled once per process.
//! - [`SchemaValidator::validate`]: rejects a document with the full
//!   list of structural violations (missing keys, wrong types, values
//!   outside an enumeration, numeric bounds, string patterns).
//! - [`load_document`]: reads a JSON or YAML manifest into a
//!   `serde_json::Value`.
//!
//! ## Crate Policy
//!
//! - Validation has no side effects.
//! - Schema errors are never recovered; they carry the instance path and
//!   a message for every violation.

pub mod validate;

pub use validate::{
    load_document, SchemaError, SchemaValidator, ValidationViolations, Violation,
    PARTITION_SCHEMA_NAME,
};
