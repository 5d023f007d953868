//! Result command implementation.
//!
//! Fetch, summarize and plot the results of a job submitted earlier.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qec_adapter_ibm::{IbmBackend, register_layout};
use qec_cli::cli::ResultArgs;
use qec_codes::{BitFlipOptions, build_qec_circuit};
use qec_hal::{Backend, JobId};

use super::common::{load_config, report_and_plot, spinner};

/// Execute the result command.
pub async fn execute(config_path: Option<&Path>, args: ResultArgs) -> Result<()> {
    let config = load_config(config_path, |config| args.plot.apply(config))?;
    let credentials = config.ibm_credentials()?;
    let job_id = JobId::new(&args.job_id);

    println!(
        "{} Fetching results for job {}",
        style("→").cyan().bold(),
        style(&job_id).dim()
    );

    // Results are decoded with the register widths of the circuit `run` submits.
    let options = BitFlipOptions {
        logical_one: args.logical_one,
        inject_error: None,
    };
    let layout = register_layout(&build_qec_circuit(&options)?.circuit);

    let backend = IbmBackend::connect_for_job(
        job_id.as_str(),
        &credentials,
        config.ibm.endpoint.as_deref(),
    )
    .await
    .with_context(|| format!("Failed to look up job {job_id}"))?
    .with_register_layout(layout);

    let job = backend.job(&job_id).await?;
    println!(
        "  Backend: {}",
        style(job.backend.as_deref().unwrap_or(backend.target())).yellow()
    );
    if let Some(session) = &job.session_id {
        println!("  Session: {}", style(session).dim());
    }

    let result = if job.status.is_pending() {
        let spinner = spinner(&format!("Waiting for job {job_id}..."))?;
        let result = backend.wait_with(&job_id, config.poll_policy()).await;
        spinner.finish_and_clear();
        result
    } else {
        backend.result(&job_id).await
    }
    .with_context(|| format!("Failed to get result of job {job_id}"))?;

    report_and_plot(&result, &options, &config, &job_id, args.plot.no_plot)
}
