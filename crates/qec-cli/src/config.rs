//! Configuration for the `qec` command-line tool.
//!
//! Values are layered, later sources winning:
//! 1. Built-in defaults
//! 2. YAML file (`--config`, else `~/.qec/config.yaml` when present)
//! 3. `.env` file in the working directory
//! 4. Environment variables (`QEC_*`, `IBM_*`)
//! 5. Command-line flags, applied by the command itself

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use qec_adapter_ibm::IbmCredentials;
use qec_hal::PollPolicy;

use crate::plot::ImageFormat;

/// Complete CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when none is given on the command line.
    #[serde(default)]
    pub backend: Option<String>,

    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Directory histograms are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: ImageFormat,

    /// Delay between job status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up waiting for a job after this many seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Run IBM jobs inside a dedicated session.
    #[serde(default = "default_true")]
    pub use_session: bool,

    #[serde(default)]
    pub ibm: IbmSettings,
}

/// IBM Quantum connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IbmSettings {
    /// Override of the API base URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Legacy bearer token.
    #[serde(default)]
    pub token: Option<String>,

    /// IBM Cloud API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// IBM Cloud service instance CRN.
    #[serde(default)]
    pub service_crn: Option<String>,

    /// Legacy `hub/group/project`.
    #[serde(default)]
    pub instance: Option<String>,
}

impl fmt::Debug for IbmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("IbmSettings")
            .field("endpoint", &self.endpoint)
            .field("token", &redact(&self.token))
            .field("api_key", &redact(&self.api_key))
            .field("service_crn", &self.service_crn)
            .field("instance", &self.instance)
            .finish()
    }
}

fn default_shots() -> u32 {
    1024
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: None,
            shots: default_shots(),
            output_dir: default_output_dir(),
            format: ImageFormat::default(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_timeout_secs(),
            use_session: default_true(),
            ibm: IbmSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::IoError(format!("{}: {e}", path.as_ref().display()))
        })?;

        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// `~/.qec/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qec").join("config.yaml"))
    }

    /// Load configuration from the file, `.env` and the environment.
    ///
    /// The result is not validated: command-line flags still apply on top,
    /// so callers run [`Config::validate`] once they have been merged.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::load_from(config_file, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an explicit variable lookup.
    pub fn load_from<F>(config_file: Option<&Path>, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };
        Ok(config.merge_vars(var))
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Numeric values that fail to parse are ignored. `IBM_TOKEN` takes
    /// precedence over `IBM_QUANTUM_TOKEN`.
    pub fn merge_vars<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("QEC_BACKEND") {
            self.backend = Some(v);
        }
        if let Some(v) = var("QEC_SHOTS").and_then(|v| v.parse().ok()) {
            self.shots = v;
        }
        if let Some(v) = var("QEC_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = var("QEC_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = v;
        }
        if let Some(v) = var("QEC_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = v;
        }

        if let Some(token) = var("IBM_TOKEN").or_else(|| var("IBM_QUANTUM_TOKEN")) {
            self.ibm.token = Some(token);
        }
        if let Some(v) = var("IBM_API_KEY") {
            self.ibm.api_key = Some(v);
        }
        if let Some(v) = var("IBM_SERVICE_CRN") {
            self.ibm.service_crn = Some(v);
        }
        if let Some(v) = var("IBM_INSTANCE") {
            self.ibm.instance = Some(v);
        }
        if let Some(v) = var("IBM_ENDPOINT") {
            self.ibm.endpoint = Some(v);
        }

        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output_dir must not be empty".to_string(),
            ));
        }
        if self.ibm.api_key.is_some() && self.ibm.service_crn.is_none() {
            return Err(ConfigError::ValidationError(
                "IBM_SERVICE_CRN is required when an IBM Cloud API key is set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.timeout_secs),
        )
    }

    /// IBM credentials, preferring an IBM Cloud API key over a bearer token.
    pub fn ibm_credentials(&self) -> Result<IbmCredentials, ConfigError> {
        match (&self.ibm.api_key, &self.ibm.service_crn, &self.ibm.token) {
            (Some(api_key), Some(service_crn), _) => Ok(IbmCredentials::Cloud {
                api_key: api_key.clone(),
                service_crn: service_crn.clone(),
            }),
            (Some(_), None, _) => Err(ConfigError::ValidationError(
                "IBM_SERVICE_CRN is required when an IBM Cloud API key is set".to_string(),
            )),
            (None, _, Some(token)) => Ok(IbmCredentials::Token {
                token: token.clone(),
                instance: self.ibm.instance.clone(),
            }),
            (None, _, None) => Err(ConfigError::ValidationError(
                "IBM Quantum credentials not found. Set IBM_TOKEN, or IBM_API_KEY and IBM_SERVICE_CRN"
                    .to_string(),
            )),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
