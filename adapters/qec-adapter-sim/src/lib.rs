//! Local state-vector simulator for QEC circuits.
//!
//! An offline stand-in for a cloud backend. Unlike a sampler that only
//! measures at the end, it evolves each shot separately so mid-circuit
//! measurement, `reset` and classically conditioned gates behave the way
//! they do on dynamic-circuit hardware.
//!
//! # Performance
//!
//! | Qubits | Memory per shot |
//! |--------|-----------------|
//! | 5      | 512 B           |
//! | 10     | 16 KB           |
//! | 20     | 16 MB           |
//!
//! # Example
//!
//! ```ignore
//! use qec_adapter_sim::SimulatorBackend;
//! use qec_hal::Backend;
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let job_id = backend.submit(&circuit, 1024).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("{:?}", result.register_counts("syndrome_register"));
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
