//! Backend capability introspection.
//!
//! Describes what a backend can run: qubit count, gate names (OpenQASM 3
//! naming), connectivity and feature flags. The QEC circuit needs
//! mid-circuit measurement and classically conditioned gates, which
//! backends advertise with the `dynamic_circuits` feature.

use serde::{Deserialize, Serialize};

use qec_ir::Circuit;

use crate::backend::ValidationResult;

/// Feature flag for mid-circuit measurement with classical feed-forward.
pub const FEATURE_DYNAMIC_CIRCUITS: &str = "dynamic_circuits";

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Qubit connectivity. All edges are bidirectional.
    pub topology: Topology,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Capability flags such as `"statevector"` or `"dynamic_circuits"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for the local state-vector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 100_000,
            is_simulator: true,
            features: vec![
                "statevector".into(),
                "mid_circuit_measurement".into(),
                FEATURE_DYNAMIC_CIRCUITS.into(),
            ],
        }
    }

    /// Create capabilities for an IBM Quantum device.
    ///
    /// The service transpiles submitted circuits, so the accepted gate set is
    /// the OpenQASM 3 standard library while `native` reflects the processor.
    pub fn ibm(name: impl Into<String>, num_qubits: u32, processor: IbmProcessor) -> Self {
        let native = match processor {
            IbmProcessor::Eagle => GateSet::ibm_eagle().native,
            IbmProcessor::Heron => GateSet::ibm_heron().native,
        };
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet {
                native,
                ..GateSet::universal()
            },
            topology: Topology::custom(vec![]),
            max_shots: 100_000,
            is_simulator: false,
            features: vec![FEATURE_DYNAMIC_CIRCUITS.into()],
        }
    }

    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Whether the backend advertises `feature`.
    pub fn supports(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Check a circuit against these capabilities.
    ///
    /// Rejects circuits that need more qubits than available, use unknown
    /// gates, or use classical conditions on a backend without dynamic
    /// circuit support. Non-native gates are reported as needing
    /// transpilation rather than as errors.
    pub fn check_circuit(&self, circuit: &Circuit) -> ValidationResult {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.num_qubits as usize {
            reasons.push(format!(
                "circuit uses {} qubits, backend '{}' has {}",
                circuit.num_qubits(),
                self.name,
                self.num_qubits
            ));
        }

        let mut non_native = Vec::new();
        let mut has_condition = false;
        for (_, inst) in circuit.dag().topological_ops() {
            let Some(gate) = inst.as_gate() else {
                continue;
            };
            has_condition |= gate.is_conditional();
            let name = gate.name();
            if !self.gate_set.contains(name) {
                let reason = format!("gate '{name}' is not supported");
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            } else if !self.gate_set.is_native(name) && !non_native.iter().any(|n| n == name) {
                non_native.push(name.to_string());
            }
        }

        if has_condition && !self.supports(FEATURE_DYNAMIC_CIRCUITS) {
            reasons.push(format!(
                "backend '{}' does not support classically conditioned gates",
                self.name
            ));
        }

        if !reasons.is_empty() {
            ValidationResult::Invalid { reasons }
        } else if !non_native.is_empty() {
            ValidationResult::RequiresTranspilation {
                details: format!("non-native gates: {}", non_native.join(", ")),
            }
        } else {
            ValidationResult::Valid
        }
    }
}

/// IBM processor families, which differ in their native two-qubit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IbmProcessor {
    /// 127-qubit Eagle processors, ECR native.
    Eagle,
    /// 133/156-qubit Heron processors, CZ native.
    Heron,
}

/// Gate set supported by a backend.
///
/// If `native` is empty, every supported gate counts as native.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    pub single_qubit: Vec<String>,
    pub two_qubit: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
    /// Gates that execute without decomposition.
    pub native: Vec<String>,
}

impl GateSet {
    /// Every gate the circuit IR can express.
    pub fn universal() -> Self {
        Self {
            single_qubit: ["id", "x", "y", "z", "h", "s", "sdg", "t", "tdg"]
                .into_iter()
                .map(String::from)
                .collect(),
            two_qubit: ["cx", "cz", "swap"].into_iter().map(String::from).collect(),
            three_qubit: vec!["ccx".into()],
            native: vec![],
        }
    }

    /// IBM Eagle: `ecr, rz, sx, x`.
    pub fn ibm_eagle() -> Self {
        Self {
            single_qubit: vec!["rz".into(), "sx".into(), "x".into(), "id".into()],
            two_qubit: vec!["ecr".into()],
            three_qubit: vec![],
            native: vec!["rz".into(), "sx".into(), "x".into(), "ecr".into(), "id".into()],
        }
    }

    /// IBM Heron: `cz, rz, sx, x`.
    pub fn ibm_heron() -> Self {
        Self {
            single_qubit: vec!["rz".into(), "sx".into(), "x".into(), "id".into()],
            two_qubit: vec!["cz".into()],
            three_qubit: vec![],
            native: vec!["rz".into(), "sx".into(), "x".into(), "cz".into(), "id".into()],
        }
    }

    /// Check if a gate is supported at all.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate executes without decomposition.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub kind: TopologyKind,
    /// Coupling edges. Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a linear topology.
    pub fn linear(n: u32) -> Self {
        Self {
            kind: TopologyKind::Linear,
            edges: (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let edges = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Create a topology from a device coupling map.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    FullyConnected,
    Linear,
    /// Heavy-hex lattice (IBM Eagle/Heron processors).
    HeavyHex,
    Custom,
}
