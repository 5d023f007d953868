//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - three-qubit bit-flip code on IBM Quantum",
        style("qec").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qec-ir           Circuit intermediate representation");
    println!("  qec-qasm3        OpenQASM 3 emitter");
    println!("  qec-hal          Backend abstraction layer");
    println!("  qec-codes        Bit-flip code construction and analysis");
    println!("  qec-adapter-sim  Local state-vector simulator");
    println!("  qec-adapter-ibm  IBM Quantum Runtime adapter");
    println!();
    println!(
        "Repository: {}",
        style(env!("CARGO_PKG_REPOSITORY")).underlined()
    );
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
