//! Measurement results.
//!
//! Bitstrings follow the OpenQASM / Qiskit convention: within a register
//! the most significant bit comes first, so `"01"` for a two-bit register
//! means bit 0 is set. When several registers are combined into one key
//! they are joined with a single space, last declared register first.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`, accumulating with earlier ones.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Number of observations of `bitstring` (zero if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Outcomes by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Outcomes in ascending bitstring order, the order histograms use.
    pub fn by_bitstring(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Fraction of shots that produced `bitstring`.
    #[allow(clippy::cast_precision_loss)]
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total_shots();
        if total == 0 {
            0.0
        } else {
            self.get(bitstring) as f64 / total as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

/// Result of executing a circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Counts over all classical registers combined.
    pub counts: Counts,
    /// Counts per classical register, keyed by register name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub register_counts: BTreeMap<String, Counts>,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time reported by the backend, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            register_counts: BTreeMap::new(),
            shots,
            execution_time_ms: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_register_counts(mut self, register: impl Into<String>, counts: Counts) -> Self {
        self.register_counts.insert(register.into(), counts);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Counts for a single classical register, if the backend reported them.
    pub fn register_counts(&self, register: &str) -> Option<&Counts> {
        self.register_counts.get(register)
    }
}

/// Join per-register bitstrings into a combined key.
///
/// `registers` is in declaration order; the combined key lists the last
/// declared register first.
pub fn join_register_bitstrings<S: AsRef<str>>(registers: &[S]) -> String {
    registers
        .iter()
        .rev()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("000", 500);
        counts.insert("001", 12);
        counts.insert("000", 12);

        assert_eq!(counts.get("000"), 512);
        assert_eq!(counts.get("111"), 0);
        assert_eq!(counts.total_shots(), 524);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_counts_sorted_and_by_bitstring() {
        let counts: Counts = [("10".to_string(), 5), ("00".to_string(), 90), ("01".to_string(), 5)]
            .into_iter()
            .collect();

        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(sorted, vec!["00", "01", "10"]);

        let ordered: Vec<_> = counts
            .by_bitstring()
            .into_iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(ordered, vec![("00", 90), ("01", 5), ("10", 5)]);

        assert_eq!(counts.most_frequent().map(|(k, _)| k.as_str()), Some("00"));
    }

    #[test]
    fn test_probability() {
        let mut counts = Counts::new();
        assert_eq!(counts.probability("0"), 0.0);
        counts.insert("0", 3);
        counts.insert("1", 1);
        assert!((counts.probability("0") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_execution_result_registers() {
        let mut syndrome = Counts::new();
        syndrome.insert("00", 100);
        let result = ExecutionResult::new(Counts::new(), 100)
            .with_register_counts("syndrome_register", syndrome)
            .with_execution_time(42);

        assert_eq!(result.execution_time_ms, Some(42));
        assert_eq!(
            result.register_counts("syndrome_register").map(Counts::total_shots),
            Some(100)
        );
        assert!(result.register_counts("result_register").is_none());
    }

    #[test]
    fn test_join_register_bitstrings() {
        assert_eq!(join_register_bitstrings(&["000", "01"]), "01 000");
        assert_eq!(join_register_bitstrings(&["1"]), "1");
        assert_eq!(join_register_bitstrings::<&str>(&[]), "");
    }

    #[test]
    fn test_result_serializes_register_counts() {
        let mut result_reg = Counts::new();
        result_reg.insert("000", 8);
        let result = ExecutionResult::new(Counts::new(), 8)
            .with_register_counts("result_register", result_reg);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["register_counts"]["result_register"]["000"], 8);
        assert!(json.get("execution_time_ms").is_none());
    }
}
