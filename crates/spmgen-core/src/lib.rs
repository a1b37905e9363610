//! # spmgen-core: Foundational Types for spmgen
//!
//! Leaf crate of the workspace. Defines the primitives every other
//! crate builds on when turning partition manifests into generated
//! sources.
//!
//! ## Key Design Principles
//!
//! 1. **One table per symbolic enumeration.** Priorities and MMIO
//!    permissions resolve through `const` [`CodeTable`]s that map in both
//!    directions. Templates reverse codes through the same tables.
//!
//! 2. **Newtype for partition identifiers.** [`PartitionId`] can only be
//!    built from a value inside the platform identifier range.
//!
//! 3. **Integer-or-hex literals.** Manifest numbers may be written as JSON
//!    integers or `0x`-prefixed strings; [`IntLiteral`] parses both.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `spmgen-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod codes;
pub mod error;
pub mod identity;
pub mod literal;

pub use codes::{CodeTable, MmioPermission, Priority, PERMISSION_TABLE, PRIORITY_TABLE};
pub use error::{LiteralError, SemanticError};
pub use identity::PartitionId;
pub use literal::IntLiteral;
