// PolyVoice API configuration
//
// This module contains the configuration structure and defaults for the PolyVoice API.
// Values are produced once at startup by the configuration validator and shared
// read-only with every request handler.

use secrecy::{ExposeSecret, SecretString};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default values for configuration
pub mod defaults {
    // Bind address
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 6000;

    // Number of HTTP workers (0 = one per CPU core)
    pub const WORKERS: usize = 1;

    pub const LOG_LEVEL: &str = "info";

    pub const ENVIRONMENT: &str = "development";

    // HTTP keep-alive in seconds
    pub const KEEPALIVE_SECONDS: u64 = 5;

    // Upper bound on a single call to the transcription service
    pub const TRANSCRIPTION_TIMEOUT_SECONDS: u64 = 120;

    // 25 MiB, the hosted model's own upload limit
    pub const MAX_FILE_SIZE: usize = 26_214_400;

    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    // Minimum worker count in the production profile
    pub const PRODUCTION_MIN_WORKERS: usize = 2;
}

/// Accepted values for `LOG_LEVEL`
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warning", "error", "critical"];

/// Accepted values for `ENVIRONMENT`
pub const ENVIRONMENTS: [&str; 2] = ["development", "production"];

/// Deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "development" => Some(Self::Development),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Immutable runtime configuration for the PolyVoice API
#[derive(Debug)]
pub struct ApiConfig {
    /// Credential for the hosted transcription service
    pub openai_api_key: Option<SecretString>,
    /// Base URL of the OpenAI-compatible API
    pub openai_base_url: String,
    /// Host IP address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Number of HTTP workers (0 = one per CPU core)
    pub workers: usize,
    /// Hot reload flag, accepted but not supported
    pub reload: bool,
    /// Log level name as configured (uvicorn naming)
    pub log_level: String,
    /// Deployment profile
    pub environment: Environment,
    /// HTTP keep-alive
    pub keep_alive: Duration,
    /// Bound on a single call to the transcription service
    pub transcription_timeout: Duration,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
    /// Directory where uploads are staged
    pub temp_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: defaults::OPENAI_BASE_URL.to_string(),
            host: IpAddr::from([0, 0, 0, 0]),
            port: defaults::PORT,
            workers: defaults::WORKERS,
            reload: false,
            log_level: defaults::LOG_LEVEL.to_string(),
            environment: Environment::Development,
            keep_alive: Duration::from_secs(defaults::KEEPALIVE_SECONDS),
            transcription_timeout: Duration::from_secs(defaults::TRANSCRIPTION_TIMEOUT_SECONDS),
            max_file_size: defaults::MAX_FILE_SIZE,
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl ApiConfig {
    /// Whether a non-empty API credential is present
    pub fn openai_configured(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .map(|key| !key.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }

    /// Effective number of HTTP workers
    ///
    /// The production profile never runs fewer than two workers, even when the
    /// CPU count is lower.
    pub fn worker_count(&self) -> usize {
        let workers = if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        };
        match self.environment {
            Environment::Production => workers.max(defaults::PRODUCTION_MIN_WORKERS),
            Environment::Development => workers,
        }
    }

    /// Address string suitable for `HttpServer::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ensures the staging directory exists
    pub fn ensure_temp_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.temp_dir)
    }
}

/// Maps a uvicorn-style log level to an `env_logger` filter
pub fn log_filter(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warning" | "warn" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}
