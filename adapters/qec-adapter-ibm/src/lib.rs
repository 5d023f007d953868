//! IBM Quantum backend adapter.
//!
//! Submits circuits to the Sampler primitive of IBM Quantum Runtime as
//! OpenQASM 3, optionally inside a dedicated session, and decodes the
//! per-register samples back into counts.
//!
//! # Authentication
//!
//! Two modes are supported, see [`IbmCredentials`]:
//!
//! - **IBM Cloud**: an API key plus the service CRN. The key is exchanged
//!   for an IAM bearer token.
//! - **Legacy platform**: a bearer token, with an optional instance of the
//!   form `hub/group/project`.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use qec_adapter_ibm::{IbmBackend, IbmCredentials};
//! use qec_hal::{Backend, SessionBackend};
//!
//! let credentials = IbmCredentials::Token {
//!     token: std::env::var("IBM_TOKEN")?,
//!     instance: None,
//! };
//! let backend = IbmBackend::connect("ibm_brisbane", &credentials, None).await?;
//! backend.open_session(Duration::from_secs(3600)).await?;
//! let job_id = backend.submit(&circuit, 1024).await?;
//! println!("Job ID: {job_id}");
//! let result = backend.wait(&job_id).await?;
//! backend.close_session().await?;
//! ```

mod api;
mod backend;
mod decode;
mod error;

pub use api::{BackendInfo, BackendStatus, DEFAULT_ENDPOINT, IbmClient, LEGACY_ENDPOINT};
pub use backend::{IbmBackend, IbmCredentials, register_layout};
pub use decode::RegisterLayout;
pub use error::{IbmError, IbmResult};
