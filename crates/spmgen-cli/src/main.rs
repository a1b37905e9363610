//! # spmgen CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Secure partition manifest validator and source generator.
#[derive(Parser, Debug)]
#[command(name = "spmgen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate partition manifests.
    Validate(spmgen_cli::validate::ValidateArgs),
    /// Generate sources from partition manifests.
    Generate(spmgen_cli::generate::GenerateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Validate(args) => spmgen_cli::validate::run(args, &mut stdout),
        Commands::Generate(args) => spmgen_cli::generate::run(args, &mut stdout),
    }
}
