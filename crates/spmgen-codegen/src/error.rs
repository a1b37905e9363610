//! Errors raised while turning a manifest set into generated sources.

use std::path::PathBuf;

use spmgen_manifest::{ConsistencyError, ManifestError};
use thiserror::Error;

/// Failure anywhere in the generation pipeline.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A manifest could not be loaded or built.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The manifest set contradicts itself.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// The file name matches neither the per-partition nor the common rule.
    #[error(
        "template '{}' is neither a per-partition ('NAME') nor a common ('common.') template",
        path.display()
    )]
    UnrecognizedTemplate {
        /// Template path.
        path: PathBuf,
    },

    /// The template does not parse.
    #[error("template '{name}' cannot be compiled: {reason}")]
    TemplateSyntax {
        /// Template file name.
        name: String,
        /// Parser message.
        reason: String,
    },

    /// Rendering failed, usually inside a helper.
    #[error("rendering template '{template}' for {target} failed: {reason}")]
    Render {
        /// Template file name.
        template: String,
        /// Partition name, or "common".
        target: String,
        /// Renderer message.
        reason: String,
    },

    /// Two rendered artifacts would be written to the same file.
    #[error("output '{}' is produced for both {first} and {second}", path.display())]
    OutputCollision {
        /// The shared output path.
        path: PathBuf,
        /// Partition name, or "common", rendered first.
        first: String,
        /// Partition name, or "common", rendered second.
        second: String,
    },

    /// The template context could not be serialized.
    #[error("cannot build template context: {0}")]
    Context(#[from] serde_json::Error),

    /// Reading a template or writing an artifact failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
