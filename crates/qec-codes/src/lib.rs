//! Quantum error-correction codes built on `qec-ir`.
//!
//! Currently this is the three-qubit bit-flip (repetition) code: two CNOTs
//! spread one data qubit over three, two ancillas pick up the pairwise
//! parities, and the measured syndrome drives a conditioned X on whichever
//! data qubit flipped.
//!
//! # Example
//!
//! ```rust
//! use qec_codes::{BitFlipOptions, build_qec_circuit};
//!
//! let code = build_qec_circuit(&BitFlipOptions::default().with_error_on(1)).unwrap();
//! assert_eq!(code.circuit.num_qubits(), 5);
//! assert_eq!(code.syndrome.name, "syndrome_register");
//! ```

pub mod analysis;
pub mod bit_flip;

pub use analysis::{QecReport, analyze};
pub use bit_flip::{
    BitFlipCircuit, BitFlipOptions, NUM_ANCILLAS, NUM_DATA_QUBITS, QUANTUM_REGISTER,
    RESULT_REGISTER, SYNDROME_REGISTER, build_qec_circuit, correct_3bit_error, decode_syndrome,
    generate_3bit_qec_circuit, syndrome_for,
};
