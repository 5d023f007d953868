//! End-to-end runs of the bit-flip circuit on the local simulator.

use proptest::prelude::*;
use qec_adapter_sim::SimulatorBackend;
use qec_codes::{
    BitFlipOptions, RESULT_REGISTER, SYNDROME_REGISTER, analyze, build_qec_circuit, syndrome_for,
};
use qec_hal::{Backend, ExecutionResult};

const SHOTS: u32 = 256;

async fn run(options: &BitFlipOptions, seed: u64) -> ExecutionResult {
    let code = build_qec_circuit(options).unwrap();
    let backend = SimulatorBackend::new().with_seed(seed);
    let job_id = backend.submit(&code.circuit, SHOTS).await.unwrap();
    backend.wait(&job_id).await.unwrap()
}

#[tokio::test]
async fn test_no_error_reads_all_zero() {
    let result = run(&BitFlipOptions::default(), 1).await;

    let data = result.register_counts(RESULT_REGISTER).unwrap();
    let syndrome = result.register_counts(SYNDROME_REGISTER).unwrap();
    assert_eq!(data.get("000"), u64::from(SHOTS));
    assert_eq!(syndrome.get("00"), u64::from(SHOTS));
    assert_eq!(result.counts.get("00 000"), u64::from(SHOTS));
}

#[tokio::test]
async fn test_single_flip_is_located_and_corrected() {
    for qubit in 0..3 {
        for logical_one in [false, true] {
            let mut options = BitFlipOptions::default().with_error_on(qubit);
            options.logical_one = logical_one;
            let result = run(&options, 7).await;

            let syndrome = format!("{:02b}", syndrome_for(qubit));
            let expected = options.expected_result();
            assert_eq!(
                result.register_counts(SYNDROME_REGISTER).unwrap().get(&syndrome),
                u64::from(SHOTS),
                "syndrome for flip on q{qubit}"
            );
            assert_eq!(
                result.register_counts(RESULT_REGISTER).unwrap().get(expected),
                u64::from(SHOTS),
                "corrected data for flip on q{qubit}, logical_one={logical_one}"
            );
            assert_eq!(
                result.counts.get(&format!("{syndrome} {expected}")),
                u64::from(SHOTS)
            );
        }
    }
}

#[tokio::test]
async fn test_report_from_simulated_run() {
    let options = BitFlipOptions::default().with_error_on(2);
    let report = analyze(&run(&options, 3).await, &options).unwrap();

    assert_eq!(report.shots, u64::from(SHOTS));
    assert_eq!(report.logical_success_rate, 1.0);
    assert_eq!(report.corrections, [0, 0, u64::from(SHOTS)]);
    assert_eq!(
        report.most_frequent_syndrome,
        Some(("10".to_string(), u64::from(SHOTS)))
    );
}

#[test]
fn test_qasm_has_registers_and_one_block_per_syndrome() {
    let code = build_qec_circuit(&BitFlipOptions::default()).unwrap();
    let qasm = qec_qasm3::emit(&code.circuit).unwrap();

    assert!(qasm.contains("qubit[5] q;"));
    assert!(qasm.contains("bit[3] result_register;"));
    assert!(qasm.contains("bit[2] syndrome_register;"));
    for value in 1..=3 {
        assert!(qasm.contains(&format!("if (syndrome_register == {value}) {{")));
    }
    assert_eq!(qasm.matches("if (").count(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_any_single_flip_is_corrected(
        qubit in proptest::option::of(0usize..3),
        logical_one in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let options = BitFlipOptions { logical_one, inject_error: qubit };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(run(&options, seed));
        let data = result.register_counts(RESULT_REGISTER).unwrap();
        prop_assert_eq!(data.get(options.expected_result()), u64::from(SHOTS));
        let syndrome = result.register_counts(SYNDROME_REGISTER).unwrap();
        prop_assert_eq!(syndrome.get(&options.expected_syndrome()), u64::from(SHOTS));
    }
}
