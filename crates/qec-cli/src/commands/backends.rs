//! Backends command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qec_adapter_ibm::BackendInfo;
use qec_adapter_sim::SimulatorBackend;
use qec_hal::Backend;

use super::common::load_config;

/// Execute the backends command.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, |_| {})?;

    println!("{} Available backends:\n", style("qec").cyan().bold());

    // Simulator
    let sim = SimulatorBackend::new();
    let caps = sim.capabilities();
    let available = sim.availability().await?.is_available;

    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style("simulator").bold(),
        if caps.is_simulator { "(local)" } else { "" }
    );
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!("    Gates: {}", caps.gate_set.native.join(", "));
    println!();

    // IBM Quantum
    let credentials = match config.ibm_credentials() {
        Ok(credentials) => credentials,
        Err(_) => {
            println!(
                "  {} {} (not configured)",
                style("○").dim(),
                style("ibm").dim()
            );
            println!("    Set IBM_TOKEN, or IBM_API_KEY and IBM_SERVICE_CRN, to enable");
            return Ok(());
        }
    };

    let listing = match credentials.client(config.ibm.endpoint.as_deref()).await {
        Ok(client) => client.list_backends().await,
        Err(e) => Err(e),
    };

    match listing {
        Ok(mut backends) => {
            backends.retain(|b| !b.simulator);
            backends.sort_by(|a, b| a.name.cmp(&b.name));
            if backends.is_empty() {
                println!("  {} {} (no devices visible)", style("○").dim(), style("ibm").dim());
            }
            for info in &backends {
                print_ibm_backend(info);
            }
        }
        Err(e) => {
            println!(
                "  {} {} ({})",
                style("○").yellow(),
                style("ibm").bold(),
                style(e).dim()
            );
        }
    }

    Ok(())
}

fn print_ibm_backend(info: &BackendInfo) {
    println!(
        "  {} {} {}",
        if info.status.operational {
            style("●").green()
        } else {
            style("○").yellow()
        },
        style(&info.name).bold(),
        info.processor_type
            .as_ref()
            .map(|p| format!("({})", p.family))
            .unwrap_or_default()
    );
    println!("    Qubits: {}", info.num_qubits);
    if let Some(pending) = info.status.pending_jobs {
        println!("    Pending jobs: {pending}");
    }
    if !info.status.operational {
        println!(
            "    Status: {}",
            info.status.status_msg.as_deref().unwrap_or("offline or maintenance")
        );
    }
    println!();
}
