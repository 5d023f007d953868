//! Hardware abstraction layer for QEC circuit execution.
//!
//! A [`Backend`] accepts a [`qec_ir::Circuit`], runs it for a number of
//! shots and returns an [`ExecutionResult`] with counts for the combined
//! classical state and for every classical register. The local simulator
//! and the IBM Quantum adapter both implement this trait, so the CLI can
//! drive either with the same code path.
//!
//! ```rust,ignore
//! use qec_hal::{Backend, PollPolicy};
//!
//! let job_id = backend.submit(&circuit, 1024).await?;
//! let result = backend.wait_with(&job_id, PollPolicy::default()).await?;
//! let syndrome = result.register_counts("syndrome_register");
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, PollPolicy, SessionBackend,
    ValidationResult,
};
pub use capability::{
    Capabilities, FEATURE_DYNAMIC_CIRCUITS, GateSet, IbmProcessor, Topology, TopologyKind,
};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult, join_register_bitstrings};
