//! Backend trait and configuration.
//!
//! The [`Backend`] trait covers the job lifecycle:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! `capabilities()` is synchronous and infallible: a backend that cannot
//! report capabilities without I/O is not correctly initialized.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use qec_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Consecutive transient status failures tolerated while waiting.
const MAX_TRANSIENT_FAILURES: u32 = 5;

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read a string entry from `extra`.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// How often and how long [`Backend::wait_with`] polls a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollPolicy {
    /// 500 ms interval, 5 minute timeout.
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Trait for quantum backends.
///
/// `submit()` returns a job id whose initial status is `Queued` (or
/// `Completed` for backends that execute synchronously). `result()` is
/// only meaningful once `status()` reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend, cached at construction time.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability with queue depth information.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job with the default [`PollPolicy`].
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_with(job_id, PollPolicy::default()).await
    }

    /// Poll until the job reaches a terminal state, then fetch its result.
    ///
    /// Up to five consecutive transient status errors are logged and
    /// retried. Returns `HalError::Timeout` once `policy.timeout` elapses.
    async fn wait_with(&self, job_id: &JobId, policy: PollPolicy) -> HalResult<ExecutionResult> {
        let deadline = Instant::now() + policy.timeout;
        let mut transient_failures = 0u32;
        let mut last_status: Option<JobStatus> = None;

        loop {
            match self.status(job_id).await {
                Ok(JobStatus::Completed) => return self.result(job_id).await,
                Ok(JobStatus::Failed(msg)) => return Err(HalError::JobFailed(msg)),
                Ok(JobStatus::Cancelled) => return Err(HalError::JobCancelled),
                Ok(status) => {
                    transient_failures = 0;
                    if last_status.as_ref() != Some(&status) {
                        debug!(job_id = %job_id, %status, "job status changed");
                        last_status = Some(status);
                    }
                }
                Err(e) if e.is_transient() && transient_failures < MAX_TRANSIENT_FAILURES => {
                    transient_failures += 1;
                    warn!(job_id = %job_id, error = %e, attempt = transient_failures, "status poll failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(HalError::Timeout(job_id.0.clone()));
            }
            // The last sleep is cut short so the job gets a final poll at the deadline.
            sleep(policy.interval.min(deadline - now)).await;
        }
    }
}

/// A backend that can reserve its device for a group of jobs.
///
/// Jobs submitted while a session is open run in the same reserved window.
#[async_trait]
pub trait SessionBackend: Backend {
    /// Open a session, or return the id of the one already open.
    async fn open_session(&self, max_ttl: Duration) -> HalResult<String>;

    /// Close the open session. Closing with no session open succeeds.
    async fn close_session(&self) -> HalResult<()>;
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Zero queue, zero wait. Typical for simulators.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit can be submitted as-is.
    Valid,
    /// Circuit cannot run on this backend.
    Invalid { reasons: Vec<String> },
    /// Circuit could run after transpilation.
    RequiresTranspilation { details: String },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Whether the circuit may be submitted to a backend that transpiles.
    pub fn is_submittable(&self) -> bool {
        !matches!(self, ValidationResult::Invalid { .. })
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
