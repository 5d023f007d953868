//! OpenQASM 3 serialization for QEC circuits.
//!
//! Produces the program text cloud runtimes accept, including named
//! classical registers, mid-circuit measurement and `if` blocks for
//! classically conditioned corrections.
//!
//! ```rust
//! use qec_ir::{Circuit, ClassicalCondition};
//! use qec_qasm3::emit;
//!
//! let mut circuit = Circuit::new("flip");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let flag = circuit.add_creg("flag", 1).unwrap();
//! circuit.measure(q.qubits[1], flag.clbits[0]).unwrap();
//! circuit
//!     .if_test(ClassicalCondition::new("flag", 1), |block| {
//!         block.x(q.qubits[0])?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let qasm = emit(&circuit).unwrap();
//! assert!(qasm.contains("flag[0] = measure q[1];"));
//! assert!(qasm.contains("if (flag == 1) {"));
//! ```

mod emitter;
mod error;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};
