//! Run command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use console::style;
use tracing::info;

use qec_adapter_ibm::IbmBackend;
use qec_adapter_sim::SimulatorBackend;
use qec_cli::cli::{RunArgs, is_simulator};
use qec_cli::config::Config;
use qec_cli::session::in_session;
use qec_codes::build_qec_circuit;
use qec_hal::{Backend, ExecutionResult, JobId, ValidationResult};
use qec_ir::Circuit;

use super::common::{load_config, report_and_plot, submit_and_wait};

/// Execute the run command.
pub async fn execute(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let config = load_config(config_path, |config| args.apply(config))?;

    let backend_name = args
        .backend
        .clone()
        .or_else(|| config.backend.clone())
        .context("No backend given. Pass an IBM backend name (e.g. ibm_brisbane) or `simulator`")?;

    let options = args.code.options();
    let code = build_qec_circuit(&options).context("Failed to build the QEC circuit")?;

    println!(
        "{} Running 3-bit QEC circuit on {} ({} shots)",
        style("→").cyan().bold(),
        style(&backend_name).yellow(),
        config.shots
    );
    println!(
        "  Circuit: {} qubits, {} clbits, depth {}",
        code.circuit.num_qubits(),
        code.circuit.num_clbits(),
        code.circuit.depth()
    );
    if let Some(qubit) = options.inject_error {
        println!("  Injected X error on q{qubit}");
    }

    let (job_id, result) = if is_simulator(&backend_name) {
        run_simulator(&code.circuit, &config, &args).await?
    } else {
        run_ibm(&backend_name, &code.circuit, &config).await?
    };

    report_and_plot(&result, &options, &config, &job_id, args.plot.no_plot)
}

async fn run_simulator(
    circuit: &Circuit,
    config: &Config,
    args: &RunArgs,
) -> Result<(JobId, ExecutionResult)> {
    let mut backend = SimulatorBackend::new();
    if let Some(seed) = args.seed {
        backend = backend.with_seed(seed);
    }
    if let Some(p) = args.noise {
        if !(0.0..=1.0).contains(&p) {
            bail!("--noise must be a probability between 0 and 1, got {p}");
        }
        backend = backend.with_bit_flip_noise(p);
        println!("  Bit-flip noise: p = {p}");
    }

    submit_and_wait(&backend, circuit, config.shots, config.poll_policy()).await
}

async fn run_ibm(
    name: &str,
    circuit: &Circuit,
    config: &Config,
) -> Result<(JobId, ExecutionResult)> {
    let credentials = config.ibm_credentials()?;

    println!("  Connecting to IBM Quantum...");
    let backend = IbmBackend::connect(name, &credentials, config.ibm.endpoint.as_deref())
        .await
        .with_context(|| format!("Failed to connect to IBM backend '{name}'"))?;

    match backend.validate(circuit).await? {
        ValidationResult::Valid => {}
        ValidationResult::RequiresTranspilation { details } => {
            info!(%details, "circuit will be transpiled by the service");
            println!("  Transpiling on the service: {details}");
        }
        ValidationResult::Invalid { reasons } => {
            bail!(
                "Circuit cannot run on '{name}': {}",
                reasons.join("; ")
            );
        }
    }

    let availability = backend.availability().await?;
    if !availability.is_available {
        bail!(
            "Backend '{name}' is not available: {}",
            availability
                .status_message
                .unwrap_or_else(|| "unknown reason".to_string())
        );
    }
    if let Some(depth) = availability.queue_depth {
        println!("  Queue: {depth} pending jobs");
    }

    let backend = &backend;
    if config.use_session {
        in_session(backend, Duration::from_secs(config.timeout_secs), |session_id| async move {
            println!("  Session: {}", style(&session_id).dim());
            submit_and_wait(backend, circuit, config.shots, config.poll_policy()).await
        })
        .await
    } else {
        submit_and_wait(backend, circuit, config.shots, config.poll_policy()).await
    }
}
