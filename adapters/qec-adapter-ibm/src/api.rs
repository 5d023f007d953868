//! IBM Quantum Runtime REST client.
//!
//! Covers the endpoints a sampler workflow needs:
//! - IAM token exchange for IBM Cloud API keys
//! - backend listing, configuration and status
//! - runtime sessions (create and close)
//! - Sampler job submission, status, results and cancellation
//!
//! Supports both the IBM Cloud API (`quantum.cloud.ibm.com/api`) and the
//! legacy token endpoint (`api.quantum-computing.ibm.com`).

use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{IbmError, IbmResult};

/// IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const IBM_API_VERSION: &str = "2026-02-01";

/// Sent with every request; the API front-end rejects the default reqwest UA.
const USER_AGENT: &str = concat!(
    "qec-bitflip/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/qec-lab/qec-bitflip)"
);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// Hub/group/project, legacy mode only.
    instance: Option<String>,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

fn default_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}

/// Turn a non-success response into an [`IbmError`].
///
/// The API reports errors either as `{"message": ..}` or as
/// `{"errors": [{"message": ..}]}`; anything else is passed through as text.
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(ApiErrorResponse::into_message)
        .unwrap_or(body);
    IbmError::ApiError {
        status,
        message: format!("{context}: {message}"),
    }
}

impl IbmClient {
    /// Create a client in legacy direct-token mode.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        Ok(Self {
            client: build_client(default_headers(token)?)?,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Create a client for the IBM Cloud API.
    ///
    /// Exchanges the API key for an IAM bearer token and attaches the
    /// `Service-CRN` header every Cloud API request requires.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let iam_response = iam_client
            .post(IAM_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !iam_response.status().is_success() {
            let status = iam_response.status();
            let body = iam_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = iam_response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let mut headers = default_headers(&iam_token.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            instance: None,
            cloud_api: true,
        })
    }

    /// Override the API endpoint, e.g. for a regional Cloud API.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the hub/group/project instance (legacy mode).
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.endpoint)
    }

    /// List the backends visible to these credentials.
    ///
    /// The Cloud API only returns names, so configuration and status are
    /// fetched per device; devices that fail are skipped with a warning.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let response = self.client.get(self.url("backends")).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        if !self.cloud_api {
            let backends: LegacyBackendsResponse = response.json().await?;
            return Ok(backends.backends);
        }

        let devices: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(devices.devices.len());
        for device in &devices.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => warn!(backend = %device.name, error = %e, "skipping backend"),
            }
        }
        Ok(backends)
    }

    /// Fetch configuration and status for one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        if !self.cloud_api {
            let response = self
                .client
                .get(self.url(&format!("backends/{name}")))
                .send()
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            if !response.status().is_success() {
                return Err(api_error(response, "backend lookup failed").await);
            }
            return Ok(response.json().await?);
        }

        let config_response = self
            .client
            .get(self.url(&format!("backends/{name}/configuration")))
            .send()
            .await?;
        if config_response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        if !config_response.status().is_success() {
            return Err(api_error(config_response, "backend configuration failed").await);
        }
        let config: BackendConfigResponse = config_response.json().await?;

        let status_response = self
            .client
            .get(self.url(&format!("backends/{name}/status")))
            .send()
            .await?;
        let status = if status_response.status().is_success() {
            status_response.json::<BackendStatusResponse>().await?.into()
        } else {
            // Configuration succeeded, so treat the device as reachable.
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(config.into_info(status))
    }

    /// Open a dedicated runtime session on `backend`.
    ///
    /// `max_ttl` bounds the session lifetime on the service side.
    pub async fn create_session(&self, backend: &str, max_ttl: Duration) -> IbmResult<String> {
        let body = session_request(backend, max_ttl, self.instance.as_deref());
        let response = self
            .client
            .post(self.url("sessions"))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let err = api_error(response, "session creation failed").await;
            return Err(IbmError::Session(err.to_string()));
        }
        let session: SessionResponse = response.json().await?;
        debug!(session_id = %session.id, backend, "session opened");
        Ok(session.id)
    }

    /// Close a session. Queued jobs still run; no new jobs are accepted.
    pub async fn close_session(&self, session_id: &str) -> IbmResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("sessions/{session_id}/close")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::Session(format!("session {session_id} not found")));
        }
        if !response.status().is_success() {
            let err = api_error(response, "session close failed").await;
            return Err(IbmError::Session(err.to_string()));
        }
        debug!(session_id, "session closed");
        Ok(())
    }

    /// Submit one circuit to the Sampler primitive.
    pub async fn submit_sampler_job(&self, job: &SamplerJob<'_>) -> IbmResult<SubmitResponse> {
        let body = job.to_body(self.cloud_api, self.instance.as_deref());
        let response = self
            .client
            .post(self.url("jobs"))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }
        Ok(response.json().await?)
    }

    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let response = self
            .client
            .get(self.url(&format!("jobs/{job_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job status failed").await);
        }
        Ok(response.json().await?)
    }

    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let response = self
            .client
            .get(self.url(&format!("jobs/{job_id}/results")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job results failed").await);
        }
        Ok(response.json().await?)
    }

    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let response = self
            .client
            .post(self.url(&format!("jobs/{job_id}/cancel")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job cancel failed").await);
        }
        Ok(())
    }
}

// ============================================================================
// Request types
// ============================================================================

/// One Sampler submission: a single PUB plus routing information.
#[derive(Debug, Clone)]
pub struct SamplerJob<'a> {
    pub backend: &'a str,
    pub qasm: &'a str,
    pub shots: u32,
    pub session_id: Option<&'a str>,
    /// Service-side transpiler level; the service maps the circuit onto
    /// the device's layout and basis.
    pub optimization_level: u8,
}

impl SamplerJob<'_> {
    /// Build the Sampler V2 request body: one PUB `[circuit, params, shots]`.
    ///
    /// Both API flavours take the same `params`; the legacy API also needs
    /// the `hub/group/project` instance on the request itself.
    pub fn to_body(&self, cloud_api: bool, instance: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "program_id": "sampler",
            "backend": self.backend,
            "params": {
                "version": 2,
                "pubs": [[self.qasm, {}, self.shots]],
                "options": { "optimization_level": self.optimization_level },
            },
        });
        if let Some(session_id) = self.session_id {
            body["session_id"] = serde_json::json!(session_id);
        }
        if let (false, Some(hub)) = (cloud_api, instance) {
            body["hub"] = serde_json::json!(hub);
        }
        body
    }
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    backend: &'a str,
    mode: &'static str,
    max_ttl: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<&'a str>,
}

fn session_request<'a>(
    backend: &'a str,
    max_ttl: Duration,
    instance: Option<&'a str>,
) -> SessionRequest<'a> {
    SessionRequest {
        backend,
        mode: "dedicated",
        max_ttl: max_ttl.as_secs(),
        instance,
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.is_empty())
            .or_else(|| self.errors.into_iter().map(|e| e.message).find(|m| !m.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<BackendInfo>,
}

/// `/backends/{name}/configuration` on the Cloud API.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    coupling_map: Option<Vec<[usize; 2]>>,
    #[serde(default)]
    processor_type: Option<ProcessorType>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u32>,
    #[serde(default)]
    supported_features: Vec<String>,
}

impl BackendConfigResponse {
    fn into_info(self, status: BackendStatus) -> BackendInfo {
        BackendInfo {
            name: self.backend_name,
            num_qubits: self.n_qubits,
            status,
            processor_type: self.processor_type,
            basis_gates: self.basis_gates,
            coupling_map: self.coupling_map.unwrap_or_default(),
            simulator: self.simulator.unwrap_or(false),
            max_shots: self.max_shots,
            supported_features: self.supported_features,
        }
    }
}

/// `/backends/{name}/status` on the Cloud API.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

impl From<BackendStatusResponse> for BackendStatus {
    fn from(s: BackendStatusResponse) -> Self {
        Self {
            operational: s.state,
            status_msg: Some(s.status).filter(|m| !m.is_empty()),
            pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
        }
    }
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub num_qubits: usize,
    pub status: BackendStatus,
    #[serde(default)]
    pub processor_type: Option<ProcessorType>,
    #[serde(default)]
    pub basis_gates: Vec<String>,
    #[serde(default)]
    pub coupling_map: Vec<[usize; 2]>,
    #[serde(default)]
    pub simulator: bool,
    #[serde(default)]
    pub max_shots: Option<u32>,
    /// Feature names such as `qasm3`.
    #[serde(default)]
    pub supported_features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    pub operational: bool,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorType {
    /// e.g. "Eagle", "Heron".
    pub family: String,
    /// Reported as a number or a string depending on the API version.
    #[serde(default)]
    pub revision: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    /// May be mixed case on the Cloud API.
    pub status: String,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub ended: Option<String>,
    /// Legacy failure detail.
    #[serde(default)]
    pub error: Option<JobError>,
    /// Cloud API state with failure reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.normalized_status().as_str(),
            "COMPLETED" | "FAILED" | "CANCELLED" | "ERROR"
        )
    }

    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Failure reason, preferring the Cloud API `state.reason`.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one PUB.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2: register name to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// V1 quasi-probabilities keyed by hex outcome.
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    /// V1 counts keyed by hex outcome.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Samples for one classical register from a V2 Sampler result.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// One hex string per shot, e.g. `["0x0", "0x2", ...]`.
    pub samples: Vec<String>,
    /// Register width, when the service reports it.
    #[serde(default)]
    pub num_bits: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: &str, state: Option<JobState>, error: Option<JobError>) -> JobStatusResponse {
        JobStatusResponse {
            id: "job".to_string(),
            status: status.to_string(),
            backend: None,
            session_id: None,
            created: None,
            ended: None,
            error,
            state,
        }
    }

    #[test]
    fn test_job_status_terminal() {
        let completed = status("COMPLETED", None, None);
        assert!(completed.is_terminal());
        assert!(completed.is_completed());

        let failed = status(
            "ERROR",
            None,
            Some(JobError {
                message: "Test error".to_string(),
            }),
        );
        assert!(failed.is_failed());
        assert_eq!(failed.error_message().unwrap(), "Test error");

        assert!(!status("Running", None, None).is_terminal());
    }

    #[test]
    fn test_job_status_cloud_mixed_case() {
        let failed = status(
            "Failed",
            Some(JobState {
                status: "Failed".to_string(),
                reason: Some("dynamic circuits not supported".to_string()),
            }),
            None,
        );
        assert!(failed.is_failed());
        assert_eq!(
            failed.error_message().unwrap(),
            "dynamic circuits not supported"
        );
    }

    #[test]
    fn test_sampler_v2_body() {
        let job = SamplerJob {
            backend: "ibm_brisbane",
            qasm: "OPENQASM 3.0;",
            shots: 1024,
            session_id: Some("sess-1"),
            optimization_level: 1,
        };
        let body = job.to_body(true, Some("ignored/in/cloud"));

        assert_eq!(body["program_id"], "sampler");
        assert_eq!(body["backend"], "ibm_brisbane");
        assert_eq!(body["session_id"], "sess-1");
        assert_eq!(body["params"]["version"], 2);
        assert_eq!(
            body["params"]["pubs"],
            serde_json::json!([["OPENQASM 3.0;", {}, 1024]])
        );
        assert_eq!(body["params"]["options"]["optimization_level"], 1);
        assert!(body.get("hub").is_none());
    }

    #[test]
    fn test_token_mode_body_uses_v2_pubs() {
        let job = SamplerJob {
            backend: "ibm_kyiv",
            qasm: "OPENQASM 3.0;",
            shots: 100,
            session_id: None,
            optimization_level: 1,
        };
        let body = job.to_body(false, Some("ibm-q/open/main"));
        assert_eq!(body["params"]["version"], 2);
        assert_eq!(
            body["params"]["pubs"],
            serde_json::json!([["OPENQASM 3.0;", {}, 100]])
        );
        assert!(body["params"].get("circuits").is_none());
        assert_eq!(body["hub"], "ibm-q/open/main");
        assert!(body.get("session_id").is_none());
    }

    #[test]
    fn test_session_request_body() {
        let body =
            serde_json::to_value(session_request("ibm_brisbane", Duration::from_secs(3600), None))
                .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "backend": "ibm_brisbane",
                "mode": "dedicated",
                "max_ttl": 3600,
            })
        );
    }

    #[test]
    fn test_api_error_message_shapes() {
        let flat: ApiErrorResponse = serde_json::from_str(r#"{"message": "bad"}"#).unwrap();
        assert_eq!(flat.into_message().as_deref(), Some("bad"));

        let nested: ApiErrorResponse =
            serde_json::from_str(r#"{"errors": [{"message": "denied", "code": 1234}]}"#).unwrap();
        assert_eq!(nested.into_message().as_deref(), Some("denied"));

        let empty: ApiErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.into_message().is_none());
    }

    #[test]
    fn test_backend_config_and_status_merge() {
        let config: BackendConfigResponse = serde_json::from_str(
            r#"{
                "backend_name": "ibm_brisbane",
                "n_qubits": 127,
                "basis_gates": ["ecr", "id", "rz", "sx", "x"],
                "processor_type": {"family": "Eagle", "revision": "3"},
                "supported_features": ["qasm3"]
            }"#,
        )
        .unwrap();
        let status: BackendStatusResponse =
            serde_json::from_str(r#"{"state": true, "status": "active", "length_queue": 12}"#)
                .unwrap();

        let info = config.into_info(status.into());
        assert_eq!(info.name, "ibm_brisbane");
        assert_eq!(info.num_qubits, 127);
        assert!(info.status.operational);
        assert_eq!(info.status.pending_jobs, Some(12));
        assert_eq!(info.processor_type.unwrap().family, "Eagle");
        assert!(!info.simulator);
    }

    #[test]
    fn test_devices_response() {
        let resp: DevicesResponse = serde_json::from_str(
            r#"{"devices": [{"name": "ibm_fez"}, {"name": "ibm_torino", "status": {"name": "online"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.devices[1].name, "ibm_torino");
    }

    #[test]
    fn test_v2_results_deserialization() {
        let json = r#"{
            "results": [{
                "data": {
                    "result_register": {"samples": ["0x0", "0x7"], "num_bits": 3},
                    "syndrome_register": {"samples": ["0x0", "0x0"]}
                },
                "metadata": {"version": 2}
            }]
        }"#;
        let response: JobResultResponse = serde_json::from_str(json).unwrap();
        let data = response.results[0].data.as_ref().unwrap();
        assert_eq!(data["result_register"].num_bits, Some(3));
        assert_eq!(data["syndrome_register"].num_bits, None);
    }

    #[test]
    fn test_legacy_client() {
        let client = IbmClient::new(LEGACY_ENDPOINT, "test-token")
            .unwrap()
            .with_endpoint("https://example.com/api/");
        assert!(!client.is_cloud_api());
        assert_eq!(client.endpoint(), "https://example.com/api");
        assert_eq!(client.url("jobs"), "https://example.com/api/v1/jobs");
        assert!(!format!("{client:?}").contains("test-token"));
    }
}
