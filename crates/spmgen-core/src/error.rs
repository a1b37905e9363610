//! # Error Types
//!
//! Errors raised by checks the partition schema cannot express. A
//! [`SemanticError`] means a document was well-typed but refers to
//! something absent or contradicts itself; it is always fatal to that
//! document.

use std::path::PathBuf;

use thiserror::Error;

/// A well-typed manifest that fails a rule outside the schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Neither `secure_functions` nor `irqs` declares an entry.
    #[error("partition '{partition}' must declare at least one secure function or IRQ")]
    NoSecureFunctionsOrIrqs {
        /// Partition name.
        partition: String,
    },

    /// A listed source file is not present next to the manifest.
    #[error("source file '{}' of partition '{partition}' does not exist", path.display())]
    MissingSourceFile {
        /// Partition name.
        partition: String,
        /// Resolved path of the missing file.
        path: PathBuf,
    },

    /// A value that must be unique inside one manifest appears twice.
    #[error("{field} '{value}' is declared more than once in partition '{partition}'")]
    DuplicateInPartition {
        /// Partition name.
        partition: String,
        /// Human-readable name of the field (e.g. "secure function sfid").
        field: &'static str,
        /// The repeated value.
        value: String,
    },

    /// A numeric literal passed the schema but cannot be resolved.
    #[error("field '{field}' of partition '{partition}': {source}")]
    InvalidLiteral {
        /// Partition name.
        partition: String,
        /// Field holding the literal.
        field: &'static str,
        /// Underlying parse failure.
        #[source]
        source: LiteralError,
    },

    /// A symbolic value has no entry in its code table.
    #[error("unknown {table} key '{key}'")]
    UnknownCode {
        /// Table that was consulted.
        table: &'static str,
        /// The key that was not found.
        key: String,
    },
}

/// Failure to resolve an integer-or-hex literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// Negative integers are never valid.
    #[error("negative value {0} is not allowed")]
    Negative(i64),

    /// The string is not a `0x`-prefixed hexadecimal number.
    #[error("'{0}' is not a hexadecimal literal")]
    NotHex(String),

    /// The value does not fit the field's range.
    #[error("value {value:#x} exceeds the maximum {max:#x}")]
    OutOfRange {
        /// Parsed value.
        value: u64,
        /// Largest accepted value.
        max: u64,
    },
}
