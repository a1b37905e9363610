//! # Validate Subcommand
//!
//! Builds every manifest and checks the set for consistency. Nothing is
//! written.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use spmgen_manifest::{validate_partition_manifests, Manifest};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Partition manifest files (JSON or YAML).
    #[arg(required = true)]
    pub manifests: Vec<PathBuf>,
}

/// Validate the manifests and print one line per partition.
pub fn run(args: &ValidateArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let manifests = args
        .manifests
        .iter()
        .map(|path| {
            Manifest::from_json(path).with_context(|| format!("invalid manifest {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    validate_partition_manifests(&manifests).context("manifest set is inconsistent")?;

    for manifest in &manifests {
        writeln!(
            out,
            "OK {} (id {}, {} secure functions, {} irqs) {}",
            manifest.name(),
            manifest.id(),
            manifest.secure_functions().len(),
            manifest.irqs().len(),
            manifest.manifest_file().display()
        )?;
    }
    tracing::info!(partitions = manifests.len(), "all manifests valid");
    Ok(())
}
