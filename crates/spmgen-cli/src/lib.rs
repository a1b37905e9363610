//! # spmgen-cli: Secure Partition Manifest Tool
//!
//! Command-line front end over the manifest and codegen crates.
//!
//! ## Subcommands
//!
//! - `validate`: schema, semantic and consistency checks
//! - `generate`: render templates into an output directory
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the library crates and only format results.

pub mod generate;
pub mod validate;
