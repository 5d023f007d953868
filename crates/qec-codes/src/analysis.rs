//! Summaries of bit-flip code runs.

use serde::{Deserialize, Serialize};

use qec_hal::{Counts, ExecutionResult, HalError, HalResult};

use crate::bit_flip::{
    BitFlipOptions, NUM_DATA_QUBITS, RESULT_REGISTER, SYNDROME_REGISTER, decode_syndrome,
};

/// Outcome statistics for one execution of the bit-flip circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QecReport {
    /// Shots counted in the result register.
    pub shots: u64,
    /// Result bitstring expected for the prepared logical state.
    pub expected_result: String,
    pub result_counts: Counts,
    pub syndrome_counts: Counts,
    /// Fraction of shots whose data-qubit majority matches the logical state.
    pub logical_success_rate: f64,
    /// Fraction of shots reading exactly the expected bitstring.
    pub exact_success_rate: f64,
    pub most_frequent_syndrome: Option<(String, u64)>,
    /// Shots in which the syndrome flagged data qubit `i` for correction.
    pub corrections: [u64; NUM_DATA_QUBITS],
}

impl QecReport {
    /// Shots in which any correction fired.
    pub fn corrected_shots(&self) -> u64 {
        self.corrections.iter().sum()
    }
}

/// Build a [`QecReport`] from per-register counts.
///
/// Fails with [`HalError::MissingRegister`] if the backend did not report
/// either register.
pub fn analyze(result: &ExecutionResult, options: &BitFlipOptions) -> HalResult<QecReport> {
    let result_counts = result
        .register_counts(RESULT_REGISTER)
        .ok_or_else(|| HalError::MissingRegister(RESULT_REGISTER.to_string()))?
        .clone();
    let syndrome_counts = result
        .register_counts(SYNDROME_REGISTER)
        .ok_or_else(|| HalError::MissingRegister(SYNDROME_REGISTER.to_string()))?
        .clone();

    let shots = result_counts.total_shots();
    let expected = options.expected_result();

    let majority_hits: u64 = result_counts
        .iter()
        .filter(|(bits, _)| majority(bits) == options.logical_one)
        .map(|(_, &count)| count)
        .sum();
    let exact_hits = result_counts.get(expected);

    let mut corrections = [0u64; NUM_DATA_QUBITS];
    for (bits, &count) in syndrome_counts.iter() {
        let target = u64::from_str_radix(bits, 2).ok().and_then(decode_syndrome);
        if let Some(qubit) = target {
            corrections[qubit] += count;
        }
    }

    let most_frequent_syndrome = syndrome_counts
        .most_frequent()
        .map(|(bits, &count)| (bits.clone(), count));

    Ok(QecReport {
        shots,
        expected_result: expected.to_string(),
        logical_success_rate: rate(majority_hits, shots),
        exact_success_rate: rate(exact_hits, shots),
        result_counts,
        syndrome_counts,
        most_frequent_syndrome,
        corrections,
    })
}

/// Majority vote over a bitstring: true if more than half the bits are `1`.
fn majority(bits: &str) -> bool {
    let ones = bits.chars().filter(|&c| c == '1').count();
    ones * 2 > bits.len()
}

#[allow(clippy::cast_precision_loss)]
fn rate(hits: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> Counts {
        entries.iter().map(|&(b, c)| (b.to_string(), c)).collect()
    }

    fn result(result_counts: &[(&str, u64)], syndrome_counts: &[(&str, u64)]) -> ExecutionResult {
        let shots: u64 = result_counts.iter().map(|(_, c)| c).sum();
        ExecutionResult::new(Counts::new(), shots as u32)
            .with_register_counts(RESULT_REGISTER, counts(result_counts))
            .with_register_counts(SYNDROME_REGISTER, counts(syndrome_counts))
    }

    #[test]
    fn test_clean_run() {
        let report = analyze(
            &result(&[("000", 1024)], &[("00", 1024)]),
            &BitFlipOptions::default(),
        )
        .unwrap();
        assert_eq!(report.shots, 1024);
        assert_eq!(report.logical_success_rate, 1.0);
        assert_eq!(report.exact_success_rate, 1.0);
        assert_eq!(report.corrected_shots(), 0);
        assert_eq!(report.most_frequent_syndrome, Some(("00".to_string(), 1024)));
    }

    #[test]
    fn test_noisy_run() {
        let report = analyze(
            &result(
                &[("000", 700), ("001", 200), ("011", 100)],
                &[("00", 600), ("01", 250), ("10", 100), ("11", 50)],
            ),
            &BitFlipOptions::default(),
        )
        .unwrap();
        assert_eq!(report.shots, 1000);
        assert!((report.logical_success_rate - 0.9).abs() < 1e-12);
        assert!((report.exact_success_rate - 0.7).abs() < 1e-12);
        assert_eq!(report.corrections, [250, 50, 100]);
        assert_eq!(report.corrected_shots(), 400);
    }

    #[test]
    fn test_logical_one_majority() {
        let report = analyze(
            &result(&[("111", 90), ("110", 8), ("000", 2)], &[("00", 100)]),
            &BitFlipOptions::default().with_logical_one(),
        )
        .unwrap();
        assert_eq!(report.expected_result, "111");
        assert!((report.logical_success_rate - 0.98).abs() < 1e-12);
        assert!((report.exact_success_rate - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_missing_register() {
        let partial = ExecutionResult::new(Counts::new(), 0)
            .with_register_counts(RESULT_REGISTER, Counts::new());
        let err = analyze(&partial, &BitFlipOptions::default()).unwrap_err();
        assert!(matches!(err, HalError::MissingRegister(name) if name == SYNDROME_REGISTER));
    }

    #[test]
    fn test_empty_counts_rate_is_zero() {
        let report = analyze(&result(&[], &[]), &BitFlipOptions::default()).unwrap();
        assert_eq!(report.shots, 0);
        assert_eq!(report.logical_success_rate, 0.0);
        assert_eq!(report.most_frequent_syndrome, None);
    }
}
