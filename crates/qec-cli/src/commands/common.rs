//! Shared helpers for CLI commands.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qec_cli::config::Config;
use qec_cli::plot::save_histograms;
use qec_cli::report::print_report;
use qec_codes::{BitFlipOptions, analyze};
use qec_hal::{Backend, ExecutionResult, JobId, PollPolicy};
use qec_ir::Circuit;

/// Load configuration, apply the command's flags, then validate the result.
pub fn load_config(path: Option<&Path>, flags: impl FnOnce(&mut Config)) -> Result<Config> {
    let mut config = Config::load(path).context("Failed to load configuration")?;
    flags(&mut config);
    config.validate()?;
    Ok(config)
}

/// A steadily ticking spinner.
pub fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Submit `circuit`, print its job id, and wait for the result.
pub async fn submit_and_wait(
    backend: &dyn Backend,
    circuit: &Circuit,
    shots: u32,
    policy: PollPolicy,
) -> Result<(JobId, ExecutionResult)> {
    let spinner = spinner("Submitting job...")?;

    let job_id = match backend.submit(circuit, shots).await {
        Ok(id) => id,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).context("Job submission failed");
        }
    };
    spinner.suspend(|| println!("Job ID: {job_id}"));

    spinner.set_message(format!("Waiting for job {job_id}..."));
    let result = backend.wait_with(&job_id, policy).await;
    spinner.finish_and_clear();

    let result = result.with_context(|| format!("Job {job_id} did not complete"))?;
    Ok((job_id, result))
}

/// Print the QEC report and save the histogram unless `no_plot` is set.
pub fn report_and_plot(
    result: &ExecutionResult,
    options: &BitFlipOptions,
    config: &Config,
    job_id: &JobId,
    no_plot: bool,
) -> Result<()> {
    let report = analyze(result, options).context("Result is missing a register")?;
    print_report(&report);

    if let Some(ms) = result.execution_time_ms {
        println!("\n  Execution time: {} ms", style(ms).yellow());
    }

    if no_plot {
        return Ok(());
    }

    let path = save_histograms(
        &report.result_counts,
        &report.syndrome_counts,
        &config.output_dir,
        job_id.as_str(),
        config.format,
    )?;
    tracing::info!(path = %path.display(), "plot written");
    println!(
        "\nThe result from job {job_id} has been saved in the '{}' directory.",
        config.output_dir.display()
    );
    Ok(())
}
