//! # spmgen-codegen: Generated Sources from Partition Manifests
//!
//! Turns a validated manifest set into source files by rendering
//! Handlebars templates.
//!
//! ## Pipeline
//!
//! ```text
//! manifest files ─▶ Manifest::from_json ─▶ validate_partition_manifests
//!                                                   │
//!               templates_dir ─▶ discover_templates ┤
//!                                                   ▼
//!                        is_up_to_date? ── yes ──▶ return output_dir
//!                                │ no
//!                                ▼
//!                      generate_source_files ─▶ output_dir
//! ```
//!
//! [`process_manifest_files`] runs the whole pipeline. The stages are
//! exported separately for callers that discover files themselves.

pub mod error;
pub mod freshness;
pub mod generate;
pub mod helpers;
pub mod process;

pub use error::CodegenError;
pub use freshness::{is_up_to_date, is_up_to_date_with, FsMtime, MtimeSource};
pub use generate::{
    discover_templates, generate_source_files, output_file_name, TemplateKind, COMMON_PREFIX,
    NAME_PLACEHOLDER, TEMPLATE_EXTENSION,
};
pub use helpers::{HelperMap, BUILTIN_HELPERS};
pub use process::process_manifest_files;
