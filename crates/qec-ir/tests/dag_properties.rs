//! Property-based tests for DAG construction.
//!
//! Random gate, measurement and conditional sequences must always leave the
//! DAG structurally valid and replay in the order they were added.

use proptest::prelude::*;
use qec_ir::{Circuit, ClassicalCondition, ClbitId, QubitId};

#[derive(Debug, Clone)]
enum Op {
    X(u32),
    H(u32),
    Cx(u32, u32),
    Measure(u32, u32),
    CondX(u32, u64),
}

impl Op {
    /// Apply the op, returning its expected instruction name if it was accepted.
    fn apply(&self, circuit: &mut Circuit) -> Option<&'static str> {
        let accepted = match *self {
            Op::X(q) => circuit.x(QubitId(q)).is_ok(),
            Op::H(q) => circuit.h(QubitId(q)).is_ok(),
            Op::Cx(a, b) => circuit.cx(QubitId(a), QubitId(b)).is_ok(),
            Op::Measure(q, c) => circuit.measure(QubitId(q), ClbitId(c)).is_ok(),
            Op::CondX(q, v) => circuit
                .if_test(ClassicalCondition::new("flags", v), |block| {
                    block.x(QubitId(q))?;
                    Ok(())
                })
                .is_ok(),
        };
        accepted.then_some(match self {
            Op::X(_) | Op::CondX(..) => "x",
            Op::H(_) => "h",
            Op::Cx(..) => "cx",
            Op::Measure(..) => "measure",
        })
    }
}

fn arb_op(num_qubits: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..num_qubits).prop_map(Op::X),
        (0..num_qubits).prop_map(Op::H),
        (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cx(a, b)),
        (0..num_qubits, 0..2u32).prop_map(|(q, c)| Op::Measure(q, c)),
        (0..num_qubits, 0..6u64).prop_map(|(q, v)| Op::CondX(q, v)),
    ]
}

fn arb_ops() -> impl Strategy<Value = (u32, Vec<Op>)> {
    (1_u32..=5).prop_flat_map(|n| (Just(n), prop::collection::vec(arb_op(n), 0..=24)))
}

proptest! {
    #[test]
    fn dag_stays_valid_and_ordered((num_qubits, ops) in arb_ops()) {
        let mut circuit = Circuit::new("prop");
        circuit.add_qreg("q", num_qubits).unwrap();
        circuit.add_creg("flags", 2).unwrap();

        let expected: Vec<&str> = ops.iter().filter_map(|op| op.apply(&mut circuit)).collect();

        prop_assert!(circuit.dag().verify_integrity().is_ok());
        prop_assert_eq!(circuit.num_ops(), expected.len());

        let replayed: Vec<&str> = circuit
            .dag()
            .topological_ops()
            .map(|(_, inst)| inst.name())
            .collect();
        prop_assert_eq!(replayed, expected);
        prop_assert!(circuit.depth() <= circuit.num_ops());
    }

    #[test]
    fn conditions_beyond_register_width_are_rejected(value in 4u64..1000) {
        let mut circuit = Circuit::new("prop");
        let q = circuit.add_qreg("q", 1).unwrap();
        circuit.add_creg("flags", 2).unwrap();
        let result = circuit.if_test(ClassicalCondition::new("flags", value), |block| {
            block.x(q.qubits[0])?;
            Ok(())
        });
        prop_assert!(result.is_err());
        prop_assert_eq!(circuit.num_ops(), 0);
    }
}
