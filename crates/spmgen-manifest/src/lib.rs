//! # spmgen-manifest: Partition Manifest Model & Consistency
//!
//! Second and third stages of the manifest pipeline.
//!
//! ## Model (`manifest`)
//!
//! [`Manifest::from_document`] runs the partition schema first, then
//! decodes the document, fills defaults, and applies the checks the
//! schema cannot express (at least one secure function or IRQ, no
//! repeated identifiers inside one partition, every source file present
//! on disk). A `Manifest` is immutable once built.
//!
//! ## Consistency (`consistency`)
//!
//! [`validate_partition_manifests`] inspects a whole set of manifests:
//! names, ids, secure-function sfids and signals, IRQ signals and line
//! numbers must be unique across the set, and every extern SFID must be
//! defined by some partition. It never mutates its input.
//!
//! ## Crate Policy
//!
//! - Construction and consistency checking are strictly separate.
//! - Every failure is a typed error; nothing is recovered or retried.

pub mod consistency;
pub mod manifest;
mod raw;

pub use consistency::{validate_partition_manifests, ConsistencyError, PartitionRef};
pub use manifest::{
    Irq, Manifest, ManifestError, MinorPolicy, MmioRegion, RegionLocation, SecureFunction,
};
pub use raw::ClientAccess;
