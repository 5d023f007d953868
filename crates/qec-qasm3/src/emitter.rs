//! QASM3 emitter for serializing circuits.

use rustc_hash::{FxHashMap, FxHashSet};

use qec_ir::{Circuit, ClassicalCondition, ClbitId, Instruction, InstructionKind, QubitId};

use crate::error::{EmitError, EmitResult};

/// Emit a circuit as OpenQASM 3 source code.
///
/// Registers are declared by name. Consecutive instructions guarded by the
/// same classical condition share one `if` block.
pub fn emit(circuit: &Circuit) -> EmitResult<String> {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit(circuit)
}

struct Emitter {
    output: String,
    indent: usize,
    qubit_names: FxHashMap<QubitId, String>,
    clbit_names: FxHashMap<ClbitId, String>,
    cregs: FxHashSet<String>,
}

impl Emitter {
    fn new(circuit: &Circuit) -> Self {
        let mut qubit_names = FxHashMap::default();
        for reg in circuit.qreg_layout() {
            for (i, q) in reg.qubits.iter().enumerate() {
                qubit_names.insert(*q, format!("{}[{i}]", reg.name));
            }
        }
        let mut clbit_names = FxHashMap::default();
        let mut cregs = FxHashSet::default();
        for reg in circuit.creg_layout() {
            for (i, c) in reg.clbits.iter().enumerate() {
                clbit_names.insert(*c, format!("{}[{i}]", reg.name));
            }
            cregs.insert(reg.name);
        }
        Self {
            output: String::new(),
            indent: 0,
            qubit_names,
            clbit_names,
            cregs,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> EmitResult<String> {
        self.writeln("OPENQASM 3.0;");
        self.writeln("");

        let qregs = circuit.qreg_layout();
        let cregs = circuit.creg_layout();
        for reg in &qregs {
            self.writeln(&format!("qubit[{}] {};", reg.size(), reg.name));
        }
        for reg in &cregs {
            self.writeln(&format!("bit[{}] {};", reg.size(), reg.name));
        }
        if !qregs.is_empty() || !cregs.is_empty() {
            self.writeln("");
        }

        let mut open_condition: Option<&ClassicalCondition> = None;
        for (_, instruction) in circuit.dag().topological_ops() {
            let condition = instruction.condition();
            if condition != open_condition {
                if open_condition.is_some() {
                    self.close_block();
                }
                if let Some(cond) = condition {
                    self.open_block(cond)?;
                }
                open_condition = condition;
            }
            self.emit_instruction(instruction)?;
        }
        if open_condition.is_some() {
            self.close_block();
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn open_block(&mut self, condition: &ClassicalCondition) -> EmitResult<()> {
        if !self.cregs.contains(&condition.register) {
            return Err(EmitError::UndeclaredRegister(condition.register.clone()));
        }
        self.writeln(&format!(
            "if ({} == {}) {{",
            condition.register, condition.value
        ));
        self.indent += 1;
        Ok(())
    }

    fn close_block(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.writeln("}");
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> EmitResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits = self.qubit_list(&instruction.qubits)?;
                self.writeln(&format!("{} {qubits};", gate.name()));
            }

            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let qubit = self.qubit(*q)?;
                    let clbit = self.clbit(*c)?;
                    self.writeln(&format!("{clbit} = measure {qubit};"));
                }
            }

            InstructionKind::Reset => {
                for q in &instruction.qubits {
                    let qubit = self.qubit(*q)?;
                    self.writeln(&format!("reset {qubit};"));
                }
            }

            InstructionKind::Barrier => {
                let qubits = self.qubit_list(&instruction.qubits)?;
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }

        Ok(())
    }

    fn qubit(&self, qubit: QubitId) -> EmitResult<String> {
        self.qubit_names
            .get(&qubit)
            .cloned()
            .ok_or(EmitError::UndeclaredQubit(qubit))
    }

    fn clbit(&self, clbit: ClbitId) -> EmitResult<String> {
        self.clbit_names
            .get(&clbit)
            .cloned()
            .ok_or(EmitError::UndeclaredClbit(clbit))
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> EmitResult<String> {
        Ok(qubits
            .iter()
            .map(|q| self.qubit(*q))
            .collect::<EmitResult<Vec<_>>>()?
            .join(", "))
    }

    fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            self.output.push_str(&"    ".repeat(self.indent));
            self.output.push_str(line);
        }
        self.output.push('\n');
    }
}
