//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::plot::ImageFormat;

/// qec - run the three-qubit bit-flip code on IBM Quantum or a local simulator
#[derive(Debug, Parser)]
#[command(name = "qec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.qec/config.yaml if present)
    #[arg(short, long, global = true, env = "QEC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the QEC circuit, run it, and plot the register histograms
    Run(RunArgs),

    /// Fetch results of an existing IBM Quantum job and plot them
    Result(ResultArgs),

    /// Print the QEC circuit
    Circuit {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = CircuitFormat::Qasm)]
        format: CircuitFormat,

        #[command(flatten)]
        code: CodeArgs,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

/// How the bit-flip block is prepared.
#[derive(Debug, Clone, Default, Args)]
pub struct CodeArgs {
    /// Apply an X error to this data qubit (0-2) after encoding
    #[arg(long, value_name = "QUBIT", value_parser = clap::value_parser!(u8).range(0..3))]
    pub inject_error: Option<u8>,

    /// Encode logical |1> instead of |0>
    #[arg(long)]
    pub logical_one: bool,
}

/// Where and how the histogram is written.
#[derive(Debug, Clone, Default, Args)]
pub struct PlotArgs {
    /// Directory for the histogram image [default: images]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Image format [default: png]
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Skip writing the histogram image
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// IBM backend name (e.g. ibm_brisbane) or `simulator`
    pub backend: Option<String>,

    /// Number of shots [default: 1024]
    #[arg(short, long)]
    pub shots: Option<u32>,

    #[command(flatten)]
    pub code: CodeArgs,

    #[command(flatten)]
    pub plot: PlotArgs,

    /// Submit without opening a runtime session
    #[arg(long)]
    pub no_session: bool,

    /// Seconds to wait for the job before giving up [default: 3600]
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Simulator only: seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulator only: probability of a bit flip on every gate operand
    #[arg(long, value_name = "P")]
    pub noise: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct ResultArgs {
    /// IBM Quantum job ID
    pub job_id: String,

    /// The job encoded logical |1> (sets the expected readout)
    #[arg(long)]
    pub logical_one: bool,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// Output format of the `circuit` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CircuitFormat {
    /// OpenQASM 3 source
    Qasm,
    /// Register and gate overview
    Summary,
}

impl CodeArgs {
    pub fn options(&self) -> qec_codes::BitFlipOptions {
        qec_codes::BitFlipOptions {
            logical_one: self.logical_one,
            inject_error: self.inject_error.map(usize::from),
        }
    }
}

impl PlotArgs {
    /// Override the configured output directory and image format.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

impl RunArgs {
    /// Merge the run flags into `config`. Flags win over file and environment.
    pub fn apply(&self, config: &mut Config) {
        self.plot.apply(config);
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.no_session {
            config.use_session = false;
        }
    }
}

/// Whether `name` selects the local simulator.
pub fn is_simulator(name: &str) -> bool {
    matches!(name.to_lowercase().as_str(), "simulator" | "sim" | "local")
}
