//! State-vector engine with projective measurement.
//!
//! Qubit `k` is bit `k` of the amplitude index.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;

use qec_ir::StandardGate;

/// Amplitudes below this norm are treated as zero when renormalizing.
const NORM_EPSILON: f64 = 1e-12;

/// A pure state over `num_qubits` qubits.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// Create a state initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { amplitudes }
    }

    /// Apply a standard gate to the given operands.
    ///
    /// Operand counts are checked when the circuit is built, so `qubits`
    /// always has `gate.num_qubits()` entries here.
    pub fn apply_gate(&mut self, gate: StandardGate, qubits: &[usize]) {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_phase(qubits[0], Complex64::new(-1.0, 0.0)),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], Complex64::new(0.0, 1.0)),
            StandardGate::Sdg => self.apply_phase(qubits[0], Complex64::new(0.0, -1.0)),
            StandardGate::T => {
                self.apply_phase(qubits[0], Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2));
            }
            StandardGate::Tdg => {
                self.apply_phase(qubits[0], Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2));
            }
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
            StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
        }
    }

    pub fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    /// Multiply the |1⟩ component of `qubit` by `phase`.
    fn apply_phase(&mut self, qubit: usize, phase: Complex64) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask != 0 && i & tgt_mask == 0 {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let mask = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let m1 = 1 << q1;
        let m2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & m1 != 0 && i & m2 == 0 {
                self.amplitudes.swap(i, (i & !m1) | m2);
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let ctrl_mask = (1 << c1) | (1 << c2);
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask == ctrl_mask && i & tgt_mask == 0 {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Probability of reading `qubit` as 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Measure `qubit` in the computational basis and collapse the state.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> bool {
        let p_one = self.probability_one(qubit);
        let r: f64 = rng.r#gen();
        let outcome = r < p_one;
        self.collapse(qubit, outcome);
        outcome
    }

    /// Measure `qubit` and flip it back to |0⟩ if it read 1.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure(qubit, rng) {
            self.apply_x(qubit);
        }
    }

    /// Project onto `qubit == outcome` and renormalize.
    fn collapse(&mut self, qubit: usize, outcome: bool) {
        let mask = 1 << qubit;
        let mut norm_sq = 0.0;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                norm_sq += amp.norm_sqr();
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        if norm_sq > NORM_EPSILON {
            let norm = norm_sq.sqrt();
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_encoding_copies_basis_state() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::CX, &[0, 1]);
        sv.apply_gate(StandardGate::CX, &[0, 2]);
        assert!(approx_eq(sv.amplitudes[0b111], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_phase_gates_compose() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::T, &[0]);
        sv.apply_gate(StandardGate::T, &[0]);
        sv.apply_gate(StandardGate::Sdg, &[0]);
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_measure_collapses_bell_pair() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut sv = Statevector::new(2);
            sv.apply_gate(StandardGate::H, &[0]);
            sv.apply_gate(StandardGate::CX, &[0, 1]);
            let first = sv.measure(0, &mut rng);
            let second = sv.measure(1, &mut rng);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_measure_is_deterministic_on_basis_states() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sv = Statevector::new(2);
        sv.apply_gate(StandardGate::X, &[1]);
        for _ in 0..20 {
            assert!(!sv.measure(0, &mut rng));
            assert!(sv.measure(1, &mut rng));
        }
    }

    #[test]
    fn test_reset_returns_qubit_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(1);
        sv.apply_gate(StandardGate::H, &[0]);
        sv.reset(0, &mut rng);
        assert!(sv.probability_one(0) < 1e-12);
    }

    #[test]
    fn test_swap_and_ccx() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::Swap, &[0, 1]);
        assert!((sv.probability_one(1) - 1.0).abs() < 1e-12);
        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::CCX, &[0, 1, 2]);
        assert!(approx_eq(sv.amplitudes[0b111], Complex64::new(1.0, 0.0)));
    }
}
