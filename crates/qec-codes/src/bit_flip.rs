//! Three-qubit bit-flip code with two syndrome ancillas.
//!
//! Qubit layout of the `q` register:
//!
//! | Qubit | Role                         |
//! |-------|------------------------------|
//! | q0    | data, carries the input      |
//! | q1    | data                         |
//! | q2    | data                         |
//! | q3    | ancilla, parity of q0 and q1 |
//! | q4    | ancilla, parity of q1 and q2 |
//!
//! The ancillas are measured into `syndrome_register` (q3 into bit 0, q4
//! into bit 1), so the register value identifies which data qubit flipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qec_ir::{
    Circuit, ClassicalCondition, ClassicalRegister, IrError, IrResult, QuantumRegister, QubitId,
};

/// Name of the 5-qubit quantum register.
pub const QUANTUM_REGISTER: &str = "q";

/// Name of the 3-bit register holding the corrected data qubits.
pub const RESULT_REGISTER: &str = "result_register";

/// Name of the 2-bit register holding the measured syndrome.
pub const SYNDROME_REGISTER: &str = "syndrome_register";

/// Data qubits in the code block.
pub const NUM_DATA_QUBITS: usize = 3;

/// Ancilla qubits used for syndrome extraction.
pub const NUM_ANCILLAS: usize = 2;

/// Preparation choices for the code block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitFlipOptions {
    /// Encode logical |1> (`x q0` before encoding) instead of |0>.
    #[serde(default)]
    pub logical_one: bool,
    /// Apply an X error to this data qubit after encoding.
    #[serde(default)]
    pub inject_error: Option<usize>,
}

impl BitFlipOptions {
    #[must_use]
    pub fn with_logical_one(mut self) -> Self {
        self.logical_one = true;
        self
    }

    #[must_use]
    pub fn with_error_on(mut self, data_qubit: usize) -> Self {
        self.inject_error = Some(data_qubit);
        self
    }

    /// Bitstring the result register should read after correction.
    pub fn expected_result(&self) -> &'static str {
        if self.logical_one { "111" } else { "000" }
    }

    /// Syndrome the prepared block should report, most significant bit first.
    pub fn expected_syndrome(&self) -> String {
        let value = self.inject_error.map_or(0, syndrome_for);
        format!("{value:02b}")
    }
}

/// A bit-flip circuit together with its register handles.
#[derive(Debug, Clone)]
pub struct BitFlipCircuit {
    pub circuit: Circuit,
    pub qreg: QuantumRegister,
    pub result: ClassicalRegister,
    pub syndrome: ClassicalRegister,
}

impl BitFlipCircuit {
    pub fn data_qubits(&self) -> &[QubitId] {
        &self.qreg.qubits[..NUM_DATA_QUBITS]
    }

    pub fn ancillas(&self) -> &[QubitId] {
        &self.qreg.qubits[NUM_DATA_QUBITS..NUM_DATA_QUBITS + NUM_ANCILLAS]
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }
}

/// Build the encoding and syndrome-extraction stages.
///
/// Allocates `q[5]`, `result_register[3]` and `syndrome_register[2]`,
/// spreads q0 over the three data qubits and copies the two pairwise
/// parities onto the ancillas. Nothing is measured yet.
pub fn generate_3bit_qec_circuit(options: &BitFlipOptions) -> IrResult<BitFlipCircuit> {
    if let Some(index) = options.inject_error {
        if index >= NUM_DATA_QUBITS {
            return Err(IrError::RegisterIndexOutOfRange {
                register: QUANTUM_REGISTER.to_string(),
                index,
                size: NUM_DATA_QUBITS,
            });
        }
    }

    let mut circuit = Circuit::new("3bit_qec");
    let qreg = circuit.add_qreg(QUANTUM_REGISTER, (NUM_DATA_QUBITS + NUM_ANCILLAS) as u32)?;
    let result = circuit.add_creg(RESULT_REGISTER, NUM_DATA_QUBITS as u32)?;
    let syndrome = circuit.add_creg(SYNDROME_REGISTER, NUM_ANCILLAS as u32)?;
    let q = &qreg.qubits;

    if options.logical_one {
        circuit.x(q[0])?;
    }

    // Encoding: |a00> -> |aaa>
    circuit.cx(q[0], q[1])?.cx(q[0], q[2])?;

    if let Some(index) = options.inject_error {
        debug!(qubit = index, "injecting bit-flip error");
        circuit.x(q[index])?;
    }

    // Syndrome extraction
    circuit
        .cx(q[0], q[3])?
        .cx(q[1], q[3])?
        .cx(q[1], q[4])?
        .cx(q[2], q[4])?;

    Ok(BitFlipCircuit {
        circuit,
        qreg,
        result,
        syndrome,
    })
}

/// Measure the syndrome, correct the flagged data qubit, and read out the data.
///
/// Each non-zero syndrome value gets its own conditioned X, so exactly one
/// correction fires per shot at most.
pub fn correct_3bit_error(code: &mut BitFlipCircuit) -> IrResult<()> {
    let q = code.qreg.qubits.clone();

    code.circuit
        .measure(q[3], code.syndrome.clbits[0])?
        .measure(q[4], code.syndrome.clbits[1])?;

    for value in 1..=code.syndrome.max_value() {
        let Some(target) = decode_syndrome(value) else {
            continue;
        };
        let qubit = q[target];
        code.circuit.if_test(
            ClassicalCondition::new(code.syndrome.name.clone(), value),
            |block| {
                block.x(qubit)?;
                Ok(())
            },
        )?;
    }

    code.circuit
        .measure_into(&q[..NUM_DATA_QUBITS], &code.result.name)?;
    Ok(())
}

/// The data qubit a syndrome value points at, or `None` for no error.
///
/// Bit 0 of the syndrome is the q0/q1 parity and bit 1 the q1/q2 parity.
pub fn decode_syndrome(value: u64) -> Option<usize> {
    match value {
        0b01 => Some(0),
        0b10 => Some(2),
        0b11 => Some(1),
        _ => None,
    }
}

/// The syndrome value a single flip of `data_qubit` produces.
pub fn syndrome_for(data_qubit: usize) -> u64 {
    let parity = |a: usize, b: usize| u64::from(data_qubit == a || data_qubit == b);
    parity(0, 1) | (parity(1, 2) << 1)
}

/// Generate the full measure-and-correct circuit.
pub fn build_qec_circuit(options: &BitFlipOptions) -> IrResult<BitFlipCircuit> {
    let mut code = generate_3bit_qec_circuit(options)?;
    correct_3bit_error(&mut code)?;
    debug!(
        ops = code.circuit.num_ops(),
        depth = code.circuit.depth(),
        "built bit-flip circuit"
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_ir::{InstructionKind, StandardGate};

    #[test]
    fn test_registers() {
        let code = generate_3bit_qec_circuit(&BitFlipOptions::default()).unwrap();
        assert_eq!(code.circuit.num_qubits(), 5);
        assert_eq!(code.circuit.num_clbits(), 5);
        assert_eq!(code.result.size(), 3);
        assert_eq!(code.syndrome.size(), 2);
        assert_eq!(code.circuit.creg(RESULT_REGISTER), Some(&code.result));
        assert_eq!(code.data_qubits().len(), 3);
        assert_eq!(code.ancillas(), &[QubitId(3), QubitId(4)]);
    }

    #[test]
    fn test_generate_gate_sequence() {
        let code = generate_3bit_qec_circuit(&BitFlipOptions::default()).unwrap();
        let pairs: Vec<(u32, u32)> = code
            .circuit
            .dag()
            .topological_ops()
            .map(|(_, inst)| {
                assert_eq!(inst.as_gate().map(|g| g.kind), Some(StandardGate::CX));
                (inst.qubits[0].0, inst.qubits[1].0)
            })
            .collect();
        assert_eq!(pairs.len(), 6);
        for expected in [(0, 1), (0, 2), (0, 3), (1, 3), (1, 4), (2, 4)] {
            assert!(pairs.contains(&expected), "missing cx{expected:?}");
        }
    }

    #[test]
    fn test_logical_one_and_injected_error_add_x() {
        let options = BitFlipOptions::default().with_logical_one().with_error_on(2);
        let code = generate_3bit_qec_circuit(&options).unwrap();
        let xs: Vec<u32> = code
            .circuit
            .dag()
            .topological_ops()
            .filter(|(_, inst)| inst.as_gate().is_some_and(|g| g.kind == StandardGate::X))
            .map(|(_, inst)| inst.qubits[0].0)
            .collect();
        assert_eq!(xs, vec![0, 2]);
    }

    #[test]
    fn test_inject_error_out_of_range() {
        let err = generate_3bit_qec_circuit(&BitFlipOptions::default().with_error_on(3));
        assert!(matches!(
            err,
            Err(IrError::RegisterIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_correction_adds_measurements_and_conditions() {
        let code = build_qec_circuit(&BitFlipOptions::default()).unwrap();
        let mut measures = 0;
        let mut conditions = Vec::new();
        for (_, inst) in code.circuit.dag().topological_ops() {
            match &inst.kind {
                InstructionKind::Measure => measures += 1,
                InstructionKind::Gate(gate) => {
                    if let Some(cond) = &gate.condition {
                        assert_eq!(cond.register, SYNDROME_REGISTER);
                        conditions.push((cond.value, inst.qubits[0].0));
                    }
                }
                _ => {}
            }
        }
        assert_eq!(measures, 5);
        conditions.sort_unstable();
        assert_eq!(conditions, vec![(1, 0), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_decode_syndrome() {
        assert_eq!(decode_syndrome(0), None);
        assert_eq!(decode_syndrome(1), Some(0));
        assert_eq!(decode_syndrome(2), Some(2));
        assert_eq!(decode_syndrome(3), Some(1));
        assert_eq!(decode_syndrome(4), None);
    }

    #[test]
    fn test_syndrome_for_inverts_decode() {
        for qubit in 0..NUM_DATA_QUBITS {
            assert_eq!(decode_syndrome(syndrome_for(qubit)), Some(qubit));
        }
        assert_eq!(syndrome_for(7), 0);
    }

    #[test]
    fn test_expected_bitstrings() {
        let options = BitFlipOptions::default();
        assert_eq!(options.expected_result(), "000");
        assert_eq!(options.expected_syndrome(), "00");

        let options = options.with_logical_one().with_error_on(2);
        assert_eq!(options.expected_result(), "111");
        assert_eq!(options.expected_syndrome(), "10");
    }
}
