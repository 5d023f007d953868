//! Circuit command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use console::style;

use qec_cli::cli::CircuitFormat;
use qec_codes::{BitFlipOptions, build_qec_circuit};
use qec_ir::Circuit;

/// Execute the circuit command.
pub fn execute(format: CircuitFormat, options: &BitFlipOptions) -> Result<()> {
    let code = build_qec_circuit(options).context("Failed to build the QEC circuit")?;

    match format {
        CircuitFormat::Qasm => {
            let source = qec_qasm3::emit(&code.circuit).context("Failed to emit OpenQASM 3")?;
            print!("{source}");
        }
        CircuitFormat::Summary => print_summary(&code.circuit),
    }

    Ok(())
}

fn print_summary(circuit: &Circuit) {
    println!("{} {}", style("Circuit:").bold(), style(circuit.name()).cyan());
    println!("  Qubits: {}", circuit.num_qubits());
    println!("  Clbits: {}", circuit.num_clbits());
    println!("  Depth:  {}", circuit.depth());
    println!("  Ops:    {}", circuit.num_ops());

    println!("\n{}", style("Registers:").bold());
    for qreg in circuit.qregs() {
        println!("  qubit[{}] {}", qreg.size(), qreg.name);
    }
    for creg in circuit.cregs() {
        println!("  bit[{}] {}", creg.size(), creg.name);
    }

    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (_, inst) in circuit.dag().topological_ops() {
        let entry = tally.entry(inst.name()).or_default();
        if inst.condition().is_some() {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }

    println!("\n{}", style("Operations:").bold());
    for (name, (plain, conditional)) in tally {
        if conditional > 0 {
            println!("  {name:<8} {plain:>3} (+{conditional} conditional)");
        } else {
            println!("  {name:<8} {plain:>3}");
        }
    }
}
