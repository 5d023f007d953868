//! `qec` command-line interface.
//!
//! Builds a 5-qubit circuit for the three-qubit bit-flip code, runs it on an
//! IBM Quantum backend (inside a runtime session) or the local simulator,
//! prints the job id, and saves a histogram of the result and syndrome
//! registers to `images/3bit_qec_result_{job_id}.png`.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use qec_cli::cli::{Cli, Commands};

mod commands;

use commands::{backends, circuit, result, run, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Run(args) => run::execute(config_path, args).await,

        Commands::Result(args) => result::execute(config_path, args).await,

        Commands::Circuit { format, code } => circuit::execute(format, &code.options()),

        Commands::Backends => backends::execute(config_path).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
