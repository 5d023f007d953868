//! Error types for the IBM Quantum adapter.

use qec_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    #[error(
        "IBM Quantum credentials not found. Set IBM_API_KEY and IBM_SERVICE_CRN, or IBM_TOKEN."
    )]
    MissingToken,

    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    #[error("IBM_SERVICE_CRN is required when using IBM_API_KEY")]
    MissingServiceCrn,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("IBM Quantum API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    #[error("Job {0} has not completed yet")]
    JobPending(String),

    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Session error: {0}")]
    Session(String),

    /// A register from the submitted layout is absent from the result payload.
    #[error("Result has no data for classical register '{0}'")]
    MissingRegister(String),

    #[error("Result payload is malformed: {0}")]
    MalformedResult(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => HalError::AuthenticationFailed(e.to_string()),
            IbmError::ApiError { status, .. } if status == 401 || status == 403 => {
                HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::ApiError { status, .. } if status >= 500 => {
                HalError::BackendUnavailable(e.to_string())
            }
            IbmError::HttpError(err) => HalError::Network(err),
            IbmError::JsonError(err) => HalError::Serialization(err),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmError::JobCancelled(_) => HalError::JobCancelled,
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::Session(msg) => HalError::Session(msg),
            IbmError::MissingRegister(name) => HalError::MissingRegister(name),
            IbmError::CircuitError(msg) => HalError::InvalidCircuit(msg),
            IbmError::TooManyQubits {
                required,
                available,
            } => HalError::CircuitTooLarge(format!(
                "Circuit requires {required} qubits but backend only has {available}"
            )),
            IbmError::InvalidParameter(msg) => HalError::Configuration(msg),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
