//! Circuit intermediate representation for the bit-flip QEC workspace.
//!
//! Circuits are stored as a DAG over quantum and classical wires. The
//! high-level [`Circuit`] builder tracks named registers and supports
//! classically conditioned blocks via [`Circuit::if_test`], which is what
//! mid-circuit syndrome correction needs.
//!
//! # Example: measure-and-correct
//!
//! ```rust
//! use qec_ir::{Circuit, ClassicalCondition};
//!
//! let mut circuit = Circuit::new("repetition");
//! let q = circuit.add_qreg("q", 3).unwrap();
//! let syndrome = circuit.add_creg("syndrome", 1).unwrap();
//!
//! circuit.cx(q.qubits[0], q.qubits[1]).unwrap();
//! circuit.cx(q.qubits[0], q.qubits[2]).unwrap();
//! circuit.cx(q.qubits[1], q.qubits[2]).unwrap();
//! circuit.measure(q.qubits[2], syndrome.clbits[0]).unwrap();
//! circuit
//!     .if_test(ClassicalCondition::new("syndrome", 1), |block| {
//!         block.x(q.qubits[1])?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.num_ops(), 5);
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, IfBlock};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, ClassicalRegister, QuantumRegister, Qubit, QubitId};
