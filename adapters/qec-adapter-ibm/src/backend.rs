//! IBM Quantum backend implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use qec_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities,
    ExecutionResult, FEATURE_DYNAMIC_CIRCUITS, HalError, HalResult, IbmProcessor, Job, JobId,
    JobStatus, SessionBackend, Topology, ValidationResult,
};
use qec_ir::Circuit;
use qec_qasm3::emit;

use crate::api::{
    BackendInfo, IbmClient, JobResultResponse, JobStatusResponse, LEGACY_ENDPOINT, SamplerJob,
};
use crate::decode::{RegisterLayout, decode_results};
use crate::error::{IbmError, IbmResult};

/// How long to cache backend info before refreshing from the API.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// Service-side transpilation level: layout, routing and basis translation.
const DEFAULT_OPTIMIZATION_LEVEL: u8 = 1;

/// Qubit count assumed when the device has not been looked up.
const FALLBACK_NUM_QUBITS: u32 = 127;

/// Credentials for IBM Quantum.
#[derive(Clone)]
pub enum IbmCredentials {
    /// IBM Cloud API key, exchanged for an IAM token, plus the instance CRN.
    Cloud { api_key: String, service_crn: String },
    /// Direct bearer token for the legacy platform.
    Token {
        token: String,
        instance: Option<String>,
    },
}

impl IbmCredentials {
    /// Build an API client for these credentials.
    pub async fn client(&self, endpoint: Option<&str>) -> IbmResult<IbmClient> {
        let client = match self {
            Self::Cloud {
                api_key,
                service_crn,
            } => {
                info!("connecting to IBM Cloud API (IAM key exchange)");
                IbmClient::connect(api_key, service_crn).await?
            }
            Self::Token { token, instance } => {
                info!("connecting to IBM Quantum with bearer token");
                let client = IbmClient::new(LEGACY_ENDPOINT, token)?;
                match instance {
                    Some(instance) => client.with_instance(instance),
                    None => client,
                }
            }
        };
        Ok(match endpoint {
            Some(endpoint) => client.with_endpoint(endpoint),
            None => client,
        })
    }
}

impl fmt::Debug for IbmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloud { service_crn, .. } => f
                .debug_struct("Cloud")
                .field("api_key", &"[REDACTED]")
                .field("service_crn", service_crn)
                .finish(),
            Self::Token { instance, .. } => f
                .debug_struct("Token")
                .field("token", &"[REDACTED]")
                .field("instance", instance)
                .finish(),
        }
    }
}

/// What decoding needs to know about a job this instance submitted.
#[derive(Debug, Clone)]
struct SubmittedJob {
    layout: RegisterLayout,
    shots: u32,
}

/// IBM Quantum backend adapter.
///
/// Jobs go to the Sampler primitive. While a session is open every
/// submission carries its id so the jobs share the reserved device window.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    capabilities: Capabilities,
    backend_info: Arc<RwLock<Option<(BackendInfo, Instant)>>>,
    session_id: Arc<RwLock<Option<String>>>,
    /// Jobs submitted through this instance whose results are not yet decoded.
    submitted: Arc<RwLock<HashMap<String, SubmittedJob>>>,
    /// Layout used for jobs this instance did not submit.
    default_layout: Option<RegisterLayout>,
    optimization_level: u8,
}

impl IbmBackend {
    fn from_parts(client: IbmClient, target: String, capabilities: Capabilities) -> Self {
        Self {
            client: Arc::new(client),
            target,
            capabilities,
            backend_info: Arc::new(RwLock::new(None)),
            session_id: Arc::new(RwLock::new(None)),
            submitted: Arc::new(RwLock::new(HashMap::new())),
            default_layout: None,
            optimization_level: DEFAULT_OPTIMIZATION_LEVEL,
        }
    }

    /// Connect to `target` and look the device up to cache its capabilities.
    pub async fn connect(
        target: impl Into<String>,
        credentials: &IbmCredentials,
        endpoint: Option<&str>,
    ) -> IbmResult<Self> {
        let target = target.into();
        let client = credentials.client(endpoint).await?;
        let info = client.get_backend(&target).await?;
        debug!(backend = %info.name, qubits = info.num_qubits, "backend found");

        let backend = Self::from_parts(client, target, capabilities_from_info(&info));
        *backend.backend_info.write().await = Some((info, Instant::now()));
        Ok(backend)
    }

    /// Connect to the backend that ran `job_id`.
    pub async fn connect_for_job(
        job_id: &str,
        credentials: &IbmCredentials,
        endpoint: Option<&str>,
    ) -> IbmResult<Self> {
        let client = credentials.client(endpoint).await?;
        let status = client.get_job_status(job_id).await?;
        let target = status.backend.ok_or_else(|| {
            IbmError::InvalidParameter(format!("job {job_id} does not report its backend"))
        })?;
        let capabilities = Capabilities::ibm(&target, FALLBACK_NUM_QUBITS, IbmProcessor::Eagle);
        Ok(Self::from_parts(client, target, capabilities))
    }

    /// Register layout to decode results of jobs submitted elsewhere.
    #[must_use]
    pub fn with_register_layout(mut self, layout: RegisterLayout) -> Self {
        self.default_layout = Some(layout);
        self
    }

    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Job metadata as reported by the service.
    pub async fn job(&self, job_id: &JobId) -> HalResult<Job> {
        let status = self.client.get_job_status(&job_id.0).await?;
        Ok(job_from_status(&status))
    }

    async fn record_submission(&self, job_id: &str, layout: RegisterLayout, shots: u32) {
        self.submitted
            .write()
            .await
            .insert(job_id.to_string(), SubmittedJob { layout, shots });
    }

    /// Decode `results` with what was recorded at submission, falling back
    /// to the default layout. The record is dropped once decoding succeeds.
    async fn decode_job(
        &self,
        job_id: &str,
        results: &JobResultResponse,
    ) -> IbmResult<ExecutionResult> {
        let recorded = self.submitted.read().await.get(job_id).cloned();
        let (layout, shots) = match recorded {
            Some(job) => (Some(job.layout), Some(job.shots)),
            None => (self.default_layout.clone(), None),
        };
        if layout.is_none() {
            warn!(%job_id, "no register layout known, inferring widths from samples");
        }

        let result = decode_results(results, layout.as_deref(), shots)?;
        self.submitted.write().await.remove(job_id);
        Ok(result)
    }

    /// Get backend information, fetching from the API if not cached or stale.
    async fn get_backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((info, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;
        *self.backend_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }
}

/// Convert a circuit to OpenQASM 3 with the standard gate library included.
pub(crate) fn circuit_to_qasm(circuit: &Circuit) -> IbmResult<String> {
    let qasm = emit(circuit).map_err(|e| IbmError::CircuitError(e.to_string()))?;
    Ok(qasm.replacen(
        "OPENQASM 3.0;",
        "OPENQASM 3.0;\ninclude \"stdgates.inc\";",
        1,
    ))
}

/// Classical registers of `circuit` in declaration order, with widths.
pub fn register_layout(circuit: &Circuit) -> RegisterLayout {
    circuit
        .creg_layout()
        .into_iter()
        .map(|reg| {
            let size = reg.size();
            (reg.name, size)
        })
        .collect()
}

fn capabilities_from_info(info: &BackendInfo) -> Capabilities {
    let processor = match info.processor_type.as_ref() {
        Some(p) if p.family.eq_ignore_ascii_case("heron") => IbmProcessor::Heron,
        _ => IbmProcessor::Eagle,
    };
    let num_qubits = u32::try_from(info.num_qubits).unwrap_or(u32::MAX);
    let mut caps = Capabilities::ibm(&info.name, num_qubits, processor);
    if !info.coupling_map.is_empty() {
        let edges = info
            .coupling_map
            .iter()
            .filter_map(|[a, b]| Some((u32::try_from(*a).ok()?, u32::try_from(*b).ok()?)))
            .collect();
        caps = caps.with_topology(Topology::custom(edges));
    }
    // Devices that list features but not `qasm3` cannot run feed-forward.
    if !info.supported_features.is_empty()
        && !info.supported_features.iter().any(|f| f == "qasm3")
    {
        caps.features.retain(|f| f != FEATURE_DYNAMIC_CIRCUITS);
    }
    if let Some(max_shots) = info.max_shots {
        caps.max_shots = max_shots;
    }
    caps
}

/// Map a service status string onto [`JobStatus`].
fn map_job_status(status: &JobStatusResponse) -> JobStatus {
    match status.status.to_uppercase().as_str() {
        "QUEUED" => JobStatus::Queued,
        "VALIDATING" | "RUNNING" => JobStatus::Running,
        "COMPLETED" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "CANCELLED" => JobStatus::Cancelled,
        _ => JobStatus::Running,
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn job_from_status(status: &JobStatusResponse) -> Job {
    let mut job = Job::new(status.id.clone(), 0).with_status(map_job_status(status));
    job.created_at = parse_timestamp(status.created.as_deref()).or(job.created_at);
    if let Some(ended) = parse_timestamp(status.ended.as_deref()) {
        job.finished_at = Some(ended);
    }
    job.backend = status.backend.clone();
    job.session_id = status.session_id.clone();
    job
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_backend_info().await {
            Ok(info) if info.status.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.status.pending_jobs,
                estimated_wait: None,
                status_message: info.status.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                warn!(error = %e, "IBM backend availability check failed");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(self.capabilities.check_circuit(circuit))
    }

    #[instrument(skip(self, circuit), fields(backend = %self.target))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be at least 1".into()));
        }

        let info = self.get_backend_info().await?;
        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            }
            .into());
        }
        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "Backend offline".to_string()),
            ));
        }

        let qasm = circuit_to_qasm(circuit)?;
        let session_id = self.session_id().await;
        let job = SamplerJob {
            backend: &self.target,
            qasm: &qasm,
            shots,
            session_id: session_id.as_deref(),
            optimization_level: self.optimization_level,
        };
        let response = self
            .client
            .submit_sampler_job(&job)
            .await
            .map_err(|e| match e {
                IbmError::ApiError { status, .. } if status == 401 || status == 403 => {
                    HalError::from(e)
                }
                other => HalError::SubmissionFailed(other.to_string()),
            })?;

        self.record_submission(&response.id, register_layout(circuit), shots)
            .await;
        info!(job_id = %response.id, session_id = ?session_id, "job submitted");
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        Ok(map_job_status(&status))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;
        match map_job_status(&status) {
            JobStatus::Completed => {}
            JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => return Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running => {
                return Err(IbmError::JobPending(job_id.0.clone()).into());
            }
        }

        let results = self.client.get_job_results(&job_id.0).await?;
        let mut result = self.decode_job(&job_id.0, &results).await?;
        let metadata = serde_json::json!({
            "job_id": job_id.0,
            "backend": status.backend.as_deref().unwrap_or(&self.target),
            "session_id": status.session_id,
            "sampler": std::mem::take(&mut result.metadata),
        });
        Ok(result.with_metadata(metadata))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionBackend for IbmBackend {
    /// Open a dedicated session on the target device.
    #[instrument(skip(self))]
    async fn open_session(&self, max_ttl: Duration) -> HalResult<String> {
        let mut session = self.session_id.write().await;
        if let Some(id) = session.as_ref() {
            return Ok(id.clone());
        }
        let id = self.client.create_session(&self.target, max_ttl).await?;
        info!(session_id = %id, backend = %self.target, "session opened");
        *session = Some(id.clone());
        Ok(id)
    }

    async fn close_session(&self) -> HalResult<()> {
        let Some(id) = self.session_id.write().await.take() else {
            return Ok(());
        };
        self.client.close_session(&id).await?;
        info!(session_id = %id, "session closed");
        Ok(())
    }
}

impl BackendFactory for IbmBackend {
    /// Build a token-mode backend without contacting the service.
    ///
    /// Recognised `extra` keys: `backend`, `instance`, `optimization_level`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let token = config
            .token
            .as_deref()
            .ok_or(IbmError::MissingToken)?;
        let target = config
            .extra_str("backend")
            .unwrap_or(config.name.as_str())
            .to_string();

        let mut client = IbmClient::new(LEGACY_ENDPOINT, token)?;
        if let Some(endpoint) = config.endpoint.as_deref() {
            client = client.with_endpoint(endpoint);
        }
        if let Some(instance) = config.extra_str("instance") {
            client = client.with_instance(instance);
        }

        let capabilities = Capabilities::ibm(&target, FALLBACK_NUM_QUBITS, IbmProcessor::Eagle);
        let mut backend = Self::from_parts(client, target, capabilities);
        if let Some(level) = config
            .extra
            .get("optimization_level")
            .and_then(serde_json::Value::as_u64)
        {
            backend = backend.with_optimization_level(u8::try_from(level).unwrap_or(3));
        }
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BackendStatus, JobState, ProcessorType};
    use qec_ir::ClassicalCondition;

    fn status(status: &str) -> JobStatusResponse {
        serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "status": status,
            "backend": "ibm_brisbane",
            "session_id": "sess-9",
            "created": "2026-03-01T12:00:00Z",
            "ended": "2026-03-01T12:04:10.5Z",
        }))
        .unwrap()
    }

    fn info(family: &str, features: &[&str]) -> BackendInfo {
        BackendInfo {
            name: "ibm_test".into(),
            num_qubits: 133,
            status: BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: Some(3),
            },
            processor_type: Some(ProcessorType {
                family: family.into(),
                revision: None,
            }),
            basis_gates: vec![],
            coupling_map: vec![[0, 1], [1, 2]],
            simulator: false,
            max_shots: Some(10_000),
            supported_features: features.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_job_status(&status("Queued")), JobStatus::Queued);
        assert_eq!(map_job_status(&status("VALIDATING")), JobStatus::Running);
        assert_eq!(map_job_status(&status("Running")), JobStatus::Running);
        assert_eq!(map_job_status(&status("COMPLETED")), JobStatus::Completed);
        assert_eq!(map_job_status(&status("Cancelled")), JobStatus::Cancelled);
        assert_eq!(map_job_status(&status("SOMETHING_NEW")), JobStatus::Running);

        let mut failed = status("Failed");
        failed.state = Some(JobState {
            status: "Failed".into(),
            reason: Some("if_else not supported".into()),
        });
        assert_eq!(
            map_job_status(&failed),
            JobStatus::Failed("if_else not supported".into())
        );
        assert_eq!(
            map_job_status(&status("ERROR")),
            JobStatus::Failed("Unknown error".into())
        );
    }

    #[test]
    fn test_job_from_status() {
        let job = job_from_status(&status("COMPLETED"));
        assert_eq!(job.id.0, "job-1");
        assert_eq!(job.backend.as_deref(), Some("ibm_brisbane"));
        assert_eq!(job.session_id.as_deref(), Some("sess-9"));
        assert_eq!(
            job.created_at.unwrap().to_rfc3339(),
            "2026-03-01T12:00:00+00:00"
        );
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_capabilities_from_info() {
        let heron = capabilities_from_info(&info("Heron", &["qasm3"]));
        assert_eq!(heron.num_qubits, 133);
        assert_eq!(heron.max_shots, 10_000);
        assert!(heron.gate_set.is_native("cz"));
        assert!(heron.topology.is_connected(1, 2));
        assert!(heron.supports(FEATURE_DYNAMIC_CIRCUITS));

        let no_qasm3 = capabilities_from_info(&info("Eagle", &["qobj"]));
        assert!(!no_qasm3.supports(FEATURE_DYNAMIC_CIRCUITS));

        let unknown = capabilities_from_info(&info("Eagle", &[]));
        assert!(unknown.supports(FEATURE_DYNAMIC_CIRCUITS));
    }

    #[test]
    fn test_circuit_to_qasm_includes_stdgates() {
        let mut circuit = Circuit::new("cond");
        let q = circuit.add_qreg("q", 2).unwrap();
        let s = circuit.add_creg("s", 1).unwrap();
        circuit.measure(q.qubits[1], s.clbits[0]).unwrap();
        circuit
            .if_test(ClassicalCondition::new("s", 1), |block| {
                block.x(q.qubits[0])?;
                Ok(())
            })
            .unwrap();

        let qasm = circuit_to_qasm(&circuit).unwrap();
        assert!(qasm.starts_with("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n"));
        assert_eq!(qasm.matches("stdgates.inc").count(), 1);
        assert!(qasm.contains("if (s == 1) {"));
    }

    #[test]
    fn test_register_layout_in_declaration_order() {
        let mut circuit = Circuit::new("layout");
        circuit.add_qreg("q", 5).unwrap();
        circuit.add_creg("result_register", 3).unwrap();
        circuit.add_creg("syndrome_register", 2).unwrap();
        assert_eq!(
            register_layout(&circuit),
            vec![
                ("result_register".to_string(), 3),
                ("syndrome_register".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = IbmBackend::from_config(BackendConfig::new("ibm_brisbane")).err();
        assert!(matches!(err, Some(HalError::AuthenticationFailed(_))));

        let backend = IbmBackend::from_config(
            BackendConfig::new("ibm")
                .with_token("t")
                .with_extra("backend", serde_json::json!("ibm_kyiv"))
                .with_extra("optimization_level", serde_json::json!(7)),
        )
        .unwrap();
        assert_eq!(backend.target(), "ibm_kyiv");
        assert_eq!(backend.name(), "ibm_kyiv");
        assert_eq!(backend.optimization_level, 3);
    }

    #[tokio::test]
    async fn test_close_session_without_open_session_is_noop() {
        let backend =
            IbmBackend::from_config(BackendConfig::new("ibm_brisbane").with_token("t")).unwrap();
        assert!(backend.session_id().await.is_none());
        assert!(backend.close_session().await.is_ok());
    }

    fn all_zero_samples(shots: usize) -> JobResultResponse {
        let samples = vec!["0x0"; shots];
        serde_json::from_value(serde_json::json!({
            "results": [{
                "data": {
                    "result_register": { "samples": samples },
                    "syndrome_register": { "samples": samples },
                },
            }],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_submission_record_dropped_after_decode() {
        let backend =
            IbmBackend::from_config(BackendConfig::new("ibm_brisbane").with_token("t")).unwrap();
        let layout = vec![
            ("result_register".to_string(), 3),
            ("syndrome_register".to_string(), 2),
        ];
        backend.record_submission("job-7", layout, 4).await;

        let result = backend
            .decode_job("job-7", &all_zero_samples(4))
            .await
            .unwrap();
        // Recorded widths win over the single bit all-zero samples would infer.
        assert_eq!(result.counts.get("00 000"), 4);
        assert!(backend.submitted.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_decode_keeps_submission_record() {
        let backend =
            IbmBackend::from_config(BackendConfig::new("ibm_brisbane").with_token("t")).unwrap();
        backend
            .record_submission("job-8", vec![("other".to_string(), 1)], 4)
            .await;

        assert!(backend.decode_job("job-8", &all_zero_samples(4)).await.is_err());
        assert!(backend.submitted.read().await.contains_key("job-8"));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = IbmCredentials::Cloud {
            api_key: "secret-key".into(),
            service_crn: "crn:v1:bluemix".into(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("crn:v1:bluemix"));
    }
}
