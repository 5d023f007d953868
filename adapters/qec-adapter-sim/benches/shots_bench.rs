//! Benchmarks for per-shot simulation of dynamic circuits
//!
//! Run with: cargo bench -p qec-adapter-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qec_adapter_sim::SimulatorBackend;
use qec_hal::Backend;
use qec_ir::{Circuit, ClassicalCondition};

/// Five-qubit repetition code with syndrome extraction and feed-forward.
fn repetition_circuit() -> Circuit {
    let mut circuit = Circuit::new("bench");
    let q = circuit.add_qreg("q", 5).unwrap();
    let result = circuit.add_creg("result", 3).unwrap();
    let syndrome = circuit.add_creg("syndrome", 2).unwrap();
    let d = &q.qubits;

    circuit.cx(d[0], d[1]).unwrap().cx(d[0], d[2]).unwrap();
    circuit
        .cx(d[0], d[3])
        .unwrap()
        .cx(d[1], d[3])
        .unwrap()
        .cx(d[1], d[4])
        .unwrap()
        .cx(d[2], d[4])
        .unwrap();
    circuit.measure(d[3], syndrome.clbits[0]).unwrap();
    circuit.measure(d[4], syndrome.clbits[1]).unwrap();
    for (value, target) in [(1, d[0]), (2, d[2]), (3, d[1])] {
        circuit
            .if_test(ClassicalCondition::new("syndrome", value), |block| {
                block.x(target)?;
                Ok(())
            })
            .unwrap();
    }
    for (i, &qubit) in d.iter().take(3).enumerate() {
        circuit.measure(qubit, result.clbits[i]).unwrap();
    }
    circuit
}

fn bench_shots(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let circuit = repetition_circuit();
    let mut group = c.benchmark_group("repetition_code");

    for shots in &[100u32, 1024, 4096] {
        group.bench_with_input(BenchmarkId::new("shots", shots), shots, |b, &n| {
            let backend = SimulatorBackend::new().with_seed(1).with_bit_flip_noise(0.01);
            b.iter(|| {
                runtime
                    .block_on(backend.submit(black_box(&circuit), black_box(n)))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shots);
criterion_main!(benches);
