//! High-level circuit builder API.

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, ClassicalRegister, QuantumRegister, Qubit, QubitId};

/// A quantum circuit.
///
/// Wraps a [`CircuitDag`] together with the qubit and classical bit
/// declarations, including named registers. Gate methods return
/// `&mut Self` so calls can be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<QuantumRegister>,
    cregs: Vec<ClassicalRegister>,
    dag: CircuitDag,
    next_qubit_id: u32,
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with unregistered qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit outside any register.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a single classical bit outside any register.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    /// Declare a quantum register of `size` fresh qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<QuantumRegister> {
        let name = name.into();
        if self.qregs.iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        let register = QuantumRegister { name, qubits: ids };
        self.qregs.push(register.clone());
        Ok(register)
    }

    /// Declare a classical register of `size` fresh bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<ClassicalRegister> {
        let name = name.into();
        if self.cregs.iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = ClbitId(self.next_clbit_id);
            self.next_clbit_id += 1;
            self.clbits.push(Clbit::with_register(id, &name, i));
            self.dag.add_clbit(id);
            ids.push(id);
        }
        let register = ClassicalRegister { name, clbits: ids };
        self.cregs.push(register.clone());
        Ok(register)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::I, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Y, [qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, [qubit])
    }

    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Sdg, [qubit])
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::T, [qubit])
    }

    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Tdg, [qubit])
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Swap, [q1, q2])
    }

    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CCX, [c1, c2, target])
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply any standard gate to the given qubits.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure `qubits[i]` into bit `i` of the named classical register.
    pub fn measure_into(&mut self, qubits: &[QubitId], register: &str) -> IrResult<&mut Self> {
        let creg = self
            .creg(register)
            .cloned()
            .ok_or_else(|| IrError::RegisterNotFound(register.to_string()))?;
        if qubits.len() > creg.size() {
            return Err(IrError::RegisterIndexOutOfRange {
                index: qubits.len() - 1,
                size: creg.size(),
                register: creg.name,
            });
        }
        for (&qubit, &clbit) in qubits.iter().zip(&creg.clbits) {
            self.measure(qubit, clbit)?;
        }
        Ok(self)
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(qubits)
    }

    /// Add a block of gates that only execute when `condition` holds at runtime.
    ///
    /// The condition's register must exist and be wide enough to hold the
    /// compared value.
    ///
    /// ```rust
    /// use qec_ir::{Circuit, ClassicalCondition};
    ///
    /// let mut circuit = Circuit::new("flag");
    /// let q = circuit.add_qreg("q", 2).unwrap();
    /// let flag = circuit.add_creg("flag", 1).unwrap();
    /// circuit.measure(q.qubits[1], flag.clbits[0]).unwrap();
    /// circuit
    ///     .if_test(ClassicalCondition::new("flag", 1), |block| {
    ///         block.x(q.qubits[0])?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// assert_eq!(circuit.num_ops(), 2);
    /// ```
    pub fn if_test<F>(&mut self, condition: ClassicalCondition, body: F) -> IrResult<&mut Self>
    where
        F: FnOnce(&mut IfBlock<'_>) -> IrResult<()>,
    {
        let creg = self
            .creg(&condition.register)
            .ok_or_else(|| IrError::RegisterNotFound(condition.register.clone()))?;
        if creg.size() == 0 || condition.value > creg.max_value() {
            return Err(IrError::ConditionOutOfRange {
                register: condition.register.clone(),
                value: condition.value,
                width: creg.size(),
            });
        }
        let bits = creg.clbits.clone();

        let mut block = IfBlock {
            circuit: &mut *self,
            condition,
            bits,
        };
        body(&mut block)?;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Declared quantum registers, in declaration order.
    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    /// Declared classical registers, in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&QuantumRegister> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Quantum registers including a synthetic one for unregistered qubits.
    ///
    /// Every qubit appears in exactly one returned register. The synthetic
    /// register is named `q` (suffixed with `_` until unique) and comes first.
    pub fn qreg_layout(&self) -> Vec<QuantumRegister> {
        let loose: Vec<QubitId> = self
            .qubits
            .iter()
            .filter(|q| q.register.is_none())
            .map(|q| q.id)
            .collect();
        let mut layout = Vec::with_capacity(self.qregs.len() + 1);
        if !loose.is_empty() {
            let name = unique_name("q", self.qregs.iter().map(|r| r.name.as_str()));
            layout.push(QuantumRegister {
                name,
                qubits: loose,
            });
        }
        layout.extend(self.qregs.iter().cloned());
        layout
    }

    /// Classical registers including a synthetic `c` register for loose bits.
    pub fn creg_layout(&self) -> Vec<ClassicalRegister> {
        let loose: Vec<ClbitId> = self
            .clbits
            .iter()
            .filter(|c| c.register.is_none())
            .map(|c| c.id)
            .collect();
        let mut layout = Vec::with_capacity(self.cregs.len() + 1);
        if !loose.is_empty() {
            let name = unique_name("c", self.cregs.iter().map(|r| r.name.as_str()));
            layout.push(ClassicalRegister {
                name,
                clbits: loose,
            });
        }
        layout.extend(self.cregs.iter().cloned());
        layout
    }
}

fn unique_name<'a>(base: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut name = base.to_string();
    while taken.clone().any(|t| t == name) {
        name.push('_');
    }
    name
}

/// Builder handed to [`Circuit::if_test`] bodies.
///
/// Every gate added through it carries the block's classical condition.
pub struct IfBlock<'a> {
    circuit: &'a mut Circuit,
    condition: ClassicalCondition,
    bits: Vec<ClbitId>,
}

impl IfBlock<'_> {
    /// Apply a conditioned standard gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.circuit.dag.apply(Instruction::conditional_gate(
            gate,
            qubits,
            self.condition.clone(),
            self.bits.iter().copied(),
        ))?;
        Ok(self)
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Y, [qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// The condition guarding this block.
    pub fn condition(&self) -> &ClassicalCondition {
        &self.condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionKind;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert!(circuit.cregs().is_empty());

        let layout = circuit.creg_layout();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].name, "c");
        assert_eq!(layout[0].size(), 2);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 5).unwrap();
        let result = circuit.add_creg("result_register", 3).unwrap();
        let syndrome = circuit.add_creg("syndrome_register", 2).unwrap();

        assert_eq!(q.size(), 5);
        assert_eq!(result.clbits, vec![ClbitId(0), ClbitId(1), ClbitId(2)]);
        assert_eq!(syndrome.clbits, vec![ClbitId(3), ClbitId(4)]);
        assert_eq!(circuit.num_clbits(), 5);
        assert_eq!(circuit.cregs().len(), 2);
        assert_eq!(circuit.clbits()[3].to_string(), "syndrome_register[0]");
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut circuit = Circuit::new("test");
        circuit.add_creg("c", 2).unwrap();
        assert!(matches!(
            circuit.add_creg("c", 1),
            Err(IrError::DuplicateRegister(name)) if name == "c"
        ));
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_if_test_conditions_every_gate() {
        let mut circuit = Circuit::new("cond");
        let q = circuit.add_qreg("q", 2).unwrap();
        let flag = circuit.add_creg("flag", 2).unwrap();
        circuit.measure(q.qubits[1], flag.clbits[0]).unwrap();
        circuit
            .if_test(ClassicalCondition::new("flag", 3), |block| {
                block.x(q.qubits[0])?.z(q.qubits[0])?;
                Ok(())
            })
            .unwrap();

        let conditioned: Vec<_> = circuit
            .dag()
            .topological_ops()
            .filter_map(|(_, inst)| inst.condition().cloned())
            .collect();
        assert_eq!(conditioned.len(), 2);
        assert!(conditioned.iter().all(|c| c.register == "flag" && c.value == 3));
    }

    #[test]
    fn test_if_test_unknown_register() {
        let mut circuit = Circuit::with_size("cond", 1, 1);
        let err = circuit
            .if_test(ClassicalCondition::new("missing", 1), |block| {
                block.x(QubitId(0))?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, IrError::RegisterNotFound(name) if name == "missing"));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_if_test_value_out_of_range() {
        let mut circuit = Circuit::new("cond");
        circuit.add_qreg("q", 1).unwrap();
        circuit.add_creg("s", 2).unwrap();
        let err = circuit
            .if_test(ClassicalCondition::new("s", 4), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, IrError::ConditionOutOfRange { value: 4, width: 2, .. }));
    }

    #[test]
    fn test_measure_into_register() {
        let mut circuit = Circuit::new("m");
        let q = circuit.add_qreg("q", 3).unwrap();
        circuit.add_creg("out", 3).unwrap();
        circuit.measure_into(&q.qubits, "out").unwrap();

        let measured: Vec<_> = circuit
            .dag()
            .topological_ops()
            .filter(|(_, inst)| matches!(inst.kind, InstructionKind::Measure))
            .map(|(_, inst)| (inst.qubits[0], inst.clbits[0]))
            .collect();
        assert_eq!(
            measured,
            vec![
                (QubitId(0), ClbitId(0)),
                (QubitId(1), ClbitId(1)),
                (QubitId(2), ClbitId(2)),
            ]
        );
    }

    #[test]
    fn test_measure_into_too_many_qubits() {
        let mut circuit = Circuit::new("m");
        let q = circuit.add_qreg("q", 3).unwrap();
        circuit.add_creg("out", 2).unwrap();
        assert!(matches!(
            circuit.measure_into(&q.qubits, "out"),
            Err(IrError::RegisterIndexOutOfRange { size: 2, .. })
        ));
    }
}
