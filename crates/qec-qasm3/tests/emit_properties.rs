//! Property-based tests for QASM3 emission.
//!
//! Checks structural properties of emitted programs for random circuits
//! with measurements and conditional blocks.

use proptest::prelude::*;
use qec_ir::{Circuit, ClassicalCondition};
use qec_qasm3::emit;

#[derive(Debug, Clone)]
enum Op {
    X(usize),
    Cx(usize, usize),
    Measure(usize, usize),
    CondX(usize, u64),
}

fn arb_ops(num_qubits: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0..num_qubits).prop_map(Op::X),
            (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cx(a, b)),
            (0..num_qubits, 0..2usize).prop_map(|(q, c)| Op::Measure(q, c)),
            (0..num_qubits, 0..4u64).prop_map(|(q, v)| Op::CondX(q, v)),
        ],
        0..=20,
    )
}

fn build(num_qubits: usize, ops: &[Op]) -> Circuit {
    let mut circuit = Circuit::new("prop");
    let q = circuit.add_qreg("q", num_qubits as u32).unwrap();
    let s = circuit.add_creg("s", 2).unwrap();
    for op in ops {
        let _ = match *op {
            Op::X(i) => circuit.x(q.qubits[i]).map(|_| ()),
            Op::Cx(a, b) => circuit.cx(q.qubits[a], q.qubits[b]).map(|_| ()),
            Op::Measure(i, c) => circuit.measure(q.qubits[i], s.clbits[c]).map(|_| ()),
            Op::CondX(i, v) => circuit
                .if_test(ClassicalCondition::new("s", v), |block| {
                    block.x(q.qubits[i])?;
                    Ok(())
                })
                .map(|_| ()),
        };
    }
    circuit
}

proptest! {
    #[test]
    fn if_blocks_are_balanced(
        (num_qubits, ops) in (1usize..=4).prop_flat_map(|n| (Just(n), arb_ops(n)))
    ) {
        let circuit = build(num_qubits, &ops);
        let qasm = emit(&circuit).unwrap();

        let opens = qasm.lines().filter(|l| l.starts_with("if (")).count();
        let closes = qasm.lines().filter(|l| *l == "}").count();
        prop_assert_eq!(opens, closes);

        // Every conditioned gate line is indented inside a block.
        let conditioned = ops.iter().filter(|op| matches!(op, Op::CondX(..))).count();
        let indented = qasm.lines().filter(|l| l.starts_with("    ")).count();
        prop_assert_eq!(indented, conditioned);
    }

    #[test]
    fn one_statement_per_operation(
        (num_qubits, ops) in (1usize..=4).prop_flat_map(|n| (Just(n), arb_ops(n)))
    ) {
        let circuit = build(num_qubits, &ops);
        let qasm = emit(&circuit).unwrap();
        let statements = qasm
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| l.ends_with(';') && !l.starts_with("qubit[") && !l.starts_with("bit["))
            .count();
        prop_assert_eq!(statements, circuit.num_ops());
    }
}
