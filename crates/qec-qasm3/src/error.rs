//! Error types for the QASM3 emitter.

use qec_ir::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while serializing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// An instruction references a qubit with no register slot.
    #[error("Qubit {0} is not declared in any register")]
    UndeclaredQubit(QubitId),

    /// An instruction references a classical bit with no register slot.
    #[error("Classical bit {0} is not declared in any register")]
    UndeclaredClbit(ClbitId),

    /// A condition names a register the circuit does not declare.
    #[error("Condition refers to undeclared register '{0}'")]
    UndeclaredRegister(String),
}

/// Result type for emitting.
pub type EmitResult<T> = Result<T, EmitError>;
