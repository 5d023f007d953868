//! Simulator backend implementation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qec_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
    join_register_bitstrings,
};
use qec_ir::{Circuit, ClassicalRegister, Instruction, InstructionKind};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
///
/// Every shot evolves a fresh state vector through the circuit in
/// topological order. Measurements collapse the state and write classical
/// memory, so gates conditioned on a register see the values measured
/// earlier in the same shot.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    max_qubits: u32,
    seed: Option<u64>,
    bit_flip_probability: f64,
}

impl SimulatorBackend {
    /// Create a simulator with default settings (20 qubits, no noise).
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            max_qubits,
            seed: None,
            bit_flip_probability: 0.0,
        }
    }

    /// Seed the sampler so each submission reproduces the same counts.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Flip each gate operand with probability `p` after the gate acts.
    ///
    /// `p` is clamped to `[0, 1]`.
    #[must_use]
    pub fn with_bit_flip_noise(mut self, p: f64) -> Self {
        self.bit_flip_probability = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a single shot, returning the final classical memory.
    fn run_shot(
        &self,
        num_qubits: usize,
        num_clbits: usize,
        instructions: &[&Instruction],
        registers: &FxHashMap<&str, &ClassicalRegister>,
        rng: &mut StdRng,
    ) -> Vec<bool> {
        let mut sv = Statevector::new(num_qubits);
        let mut memory = vec![false; num_clbits];

        for inst in instructions {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    if let Some(cond) = &gate.condition {
                        let fires = registers
                            .get(cond.register.as_str())
                            .is_some_and(|reg| reg.value_in(&memory) == cond.value);
                        if !fires {
                            continue;
                        }
                    }
                    let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
                    sv.apply_gate(gate.kind, &qubits);
                    if self.bit_flip_probability > 0.0 {
                        for &q in &qubits {
                            if rng.gen_bool(self.bit_flip_probability) {
                                sv.apply_x(q);
                            }
                        }
                    }
                }
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        memory[c.index()] = sv.measure(q.index(), rng);
                    }
                }
                InstructionKind::Reset => {
                    for q in &inst.qubits {
                        sv.reset(q.index(), rng);
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        memory
    }

    /// Run all shots synchronously.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();
        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        debug!(num_qubits, shots, "starting simulation");

        let cregs = circuit.creg_layout();
        let registers: FxHashMap<&str, &ClassicalRegister> =
            cregs.iter().map(|r| (r.name.as_str(), r)).collect();
        let instructions: Vec<&Instruction> = circuit
            .dag()
            .topological_ops()
            .map(|(_, inst)| inst)
            .collect();

        let mut rng = self.rng();
        let mut counts = Counts::new();
        let mut per_register = vec![Counts::new(); cregs.len()];

        for shot in 0..shots {
            let memory = self.run_shot(num_qubits, num_clbits, &instructions, &registers, &mut rng);
            let parts: Vec<String> = cregs.iter().map(|r| r.bitstring_in(&memory)).collect();
            counts.insert(join_register_bitstrings(&parts), 1);
            for (reg_counts, part) in per_register.iter_mut().zip(parts) {
                reg_counts.insert(part, 1);
            }

            if shot > 0 && shot % 1000 == 0 {
                debug!(shot, "shots completed");
            }
        }

        let elapsed = start.elapsed();
        debug!(?elapsed, "simulation completed");

        let mut result = ExecutionResult::new(counts, shots)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_metadata(serde_json::json!({
                "method": "statevector",
                "seed": self.seed,
                "bit_flip_probability": self.bit_flip_probability,
            }));
        for (reg, reg_counts) in cregs.iter().zip(per_register) {
            result = result.with_register_counts(reg.name.clone(), reg_counts);
        }
        result
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(self.capabilities.check_circuit(circuit))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be at least 1".into()));
        }
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.max_qubits
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.name());
        self.lock_jobs().insert(
            job_id.0.clone(),
            SimJob {
                job: job.with_status(JobStatus::Running),
                result: None,
            },
        );
        debug!(%job_id, "submitted job");

        let result = self.run_simulation(circuit, shots);

        if let Some(sim_job) = self.lock_jobs().get_mut(&job_id.0) {
            sim_job.result = Some(result);
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Completed);
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock_jobs()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.lock_jobs()
            .get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !sim_job.job.status.is_terminal() {
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
        }
        Ok(())
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra.get("max_qubits") {
            None => DEFAULT_MAX_QUBITS,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| HalError::Configuration(format!("invalid max_qubits: {v}")))?,
        };
        let seed = config.extra.get("seed").and_then(serde_json::Value::as_u64);
        let noise = config
            .extra
            .get("bit_flip_probability")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);

        let mut backend = Self::with_max_qubits(max_qubits).with_bit_flip_noise(noise);
        backend.seed = seed;
        backend.config = config;
        Ok(backend)
    }
}
