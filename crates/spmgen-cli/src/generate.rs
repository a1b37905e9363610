//! # Generate Subcommand
//!
//! Runs the full pipeline and prints the output directory.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use spmgen_codegen::{process_manifest_files, HelperMap};

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory holding the `.tpl` templates.
    #[arg(long, short = 't')]
    pub templates: PathBuf,

    /// Directory the generated files are written to.
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Partition manifest files (JSON or YAML).
    #[arg(required = true)]
    pub manifests: Vec<PathBuf>,
}

/// Generate sources and print where they were written.
pub fn run(args: &GenerateArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let output = process_manifest_files(&args.manifests, &args.templates, &args.output, HelperMap::new())
        .with_context(|| format!("generating sources into {}", args.output.display()))?;
    writeln!(out, "{}", output.display())?;
    Ok(())
}
