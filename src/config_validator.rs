// Configuration validation module for PolyVoice API
//
// This module validates every configuration parameter sourced from the environment
// and produces the immutable `ApiConfig` used by the server.
//
// The validation system is schema-driven: a central parameter registry defines the
// type, default and range of each option.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::{error, info, warn};
use secrecy::SecretString;

use crate::config::{defaults, ApiConfig, Environment, ENVIRONMENTS, LOG_LEVELS};

/// Configuration parameter types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigType {
    String,
    Secret,
    Integer,
    UnsignedInteger,
    Boolean,
    IpAddress,
    Port,
    Enum(&'static [&'static str]),
}

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationLevel {
    Critical, // Must be valid for application to start
    Standard, // Important but application can start with defaults
    Warning,  // Optional, generates warnings only
}

/// Configuration parameter definition
#[derive(Debug, Clone)]
pub struct ConfigParam {
    pub name: &'static str,
    pub description: &'static str,
    pub param_type: ConfigType,
    pub default_value: Option<&'static str>,
    pub validation_level: ValidationLevel,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

/// Centralized configuration parameter registry
pub const CONFIG_PARAMS: &[ConfigParam] = &[
    // External service
    ConfigParam {
        name: "OPENAI_API_KEY",
        description: "API key for the hosted transcription model",
        param_type: ConfigType::Secret,
        default_value: None,
        validation_level: ValidationLevel::Warning,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "OPENAI_BASE_URL",
        description: "Base URL of the OpenAI-compatible API",
        param_type: ConfigType::String,
        default_value: Some(defaults::OPENAI_BASE_URL),
        validation_level: ValidationLevel::Standard,
        min_value: None,
        max_value: None,
    },
    // Server
    ConfigParam {
        name: "HOST",
        description: "Host IP address for the API server",
        param_type: ConfigType::IpAddress,
        default_value: Some(defaults::HOST),
        validation_level: ValidationLevel::Critical,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "PORT",
        description: "Port for the API server",
        param_type: ConfigType::Port,
        default_value: Some("6000"),
        validation_level: ValidationLevel::Critical,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "WORKERS",
        description: "Number of HTTP workers (0 = use CPU cores)",
        param_type: ConfigType::UnsignedInteger,
        default_value: Some("1"),
        validation_level: ValidationLevel::Standard,
        min_value: Some(0),
        max_value: Some(64),
    },
    ConfigParam {
        name: "RELOAD",
        description: "Hot reload flag (accepted for compatibility, not supported)",
        param_type: ConfigType::Boolean,
        default_value: Some("false"),
        validation_level: ValidationLevel::Warning,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "LOG_LEVEL",
        description: "Log level",
        param_type: ConfigType::Enum(&LOG_LEVELS),
        default_value: Some(defaults::LOG_LEVEL),
        validation_level: ValidationLevel::Standard,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "ENVIRONMENT",
        description: "Deployment profile",
        param_type: ConfigType::Enum(&ENVIRONMENTS),
        default_value: Some(defaults::ENVIRONMENT),
        validation_level: ValidationLevel::Standard,
        min_value: None,
        max_value: None,
    },
    ConfigParam {
        name: "KEEPALIVE_SECONDS",
        description: "Keep-alive timeout in seconds",
        param_type: ConfigType::Integer,
        default_value: Some("5"),
        validation_level: ValidationLevel::Standard,
        min_value: Some(1),
        max_value: Some(3600),
    },
    // Processing
    ConfigParam {
        name: "TRANSCRIPTION_TIMEOUT_SECONDS",
        description: "Timeout in seconds for a single call to the transcription service",
        param_type: ConfigType::Integer,
        default_value: Some("120"),
        validation_level: ValidationLevel::Standard,
        min_value: Some(1),
        max_value: Some(3600),
    },
    ConfigParam {
        name: "MAX_FILE_SIZE",
        description: "Maximum upload size in bytes",
        param_type: ConfigType::UnsignedInteger,
        default_value: Some("26214400"),
        validation_level: ValidationLevel::Standard,
        min_value: Some(1),
        max_value: None,
    },
    ConfigParam {
        name: "POLYVOICE_TMP_DIR",
        description: "Directory where uploads are staged (defaults to the system temp dir)",
        param_type: ConfigType::String,
        default_value: None,
        validation_level: ValidationLevel::Standard,
        min_value: None,
        max_value: None,
    },
];

#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub value: String,
    pub error_type: ConfigErrorType,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigErrorType {
    InvalidValue,
    InvalidFormat,
    InvalidRange,
    Required,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Configuration error in '{}' ({:?}): {} (value: '{}')",
            self.field, self.error_type, self.message, self.value
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " - Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result type for configuration validation
pub type ValidationResult<T> = Result<T, ConfigValidationError>;

/// Configuration validation results
#[derive(Debug, Default)]
pub struct ValidationResults {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ConfigValidationError) {
        self.warnings.push(warning);
    }

    pub fn print_summary(&self) {
        if !self.errors.is_empty() {
            error!(
                "Configuration validation found {} error(s):",
                self.errors.len()
            );
            for (i, err) in self.errors.iter().enumerate() {
                error!("  {}. {}", i + 1, err);
            }
        }

        if !self.warnings.is_empty() {
            warn!(
                "Configuration validation found {} warning(s):",
                self.warnings.len()
            );
            for (i, warning) in self.warnings.iter().enumerate() {
                warn!("  {}. {}", i + 1, warning);
            }
        }

        if self.is_valid() && self.warnings.is_empty() {
            info!("Configuration validation passed successfully");
        } else if self.is_valid() {
            info!(
                "Configuration validation passed with {} warning(s)",
                self.warnings.len()
            );
        }
    }
}

impl std::fmt::Display for ValidationResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Helper functions for common validation patterns
pub mod validators {
    use super::*;

    fn invalid(
        field: &str,
        value: &str,
        error_type: ConfigErrorType,
        message: String,
        suggestion: String,
    ) -> ConfigValidationError {
        ConfigValidationError {
            field: field.to_string(),
            value: value.to_string(),
            error_type,
            message,
            suggestion: Some(suggestion),
        }
    }

    /// Validate boolean values (true/false, 1/0, yes/no, on/off)
    pub fn validate_boolean(field: &str, value: &str) -> ValidationResult<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(invalid(
                field,
                value,
                ConfigErrorType::InvalidFormat,
                "Invalid boolean format".to_string(),
                "Use true/false, 1/0, yes/no or on/off".to_string(),
            )),
        }
    }

    fn check_range(
        field: &str,
        value: &str,
        parsed: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> ValidationResult<()> {
        if let Some(min) = min {
            if parsed < min {
                return Err(invalid(
                    field,
                    value,
                    ConfigErrorType::InvalidRange,
                    format!("Value {} is below minimum {}", parsed, min),
                    format!("Use a value >= {}", min),
                ));
            }
        }

        if let Some(max) = max {
            if parsed > max {
                return Err(invalid(
                    field,
                    value,
                    ConfigErrorType::InvalidRange,
                    format!("Value {} is above maximum {}", parsed, max),
                    format!("Use a value <= {}", max),
                ));
            }
        }

        Ok(())
    }

    /// Validate integer values with optional range
    pub fn validate_integer(
        field: &str,
        value: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> ValidationResult<i64> {
        let parsed = value.trim().parse::<i64>().map_err(|_| {
            invalid(
                field,
                value,
                ConfigErrorType::InvalidFormat,
                "Invalid integer format".to_string(),
                "Use a valid integer number".to_string(),
            )
        })?;
        check_range(field, value, parsed, min, max)?;
        Ok(parsed)
    }

    /// Validate unsigned integer values with optional range
    pub fn validate_usize(
        field: &str,
        value: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> ValidationResult<usize> {
        let parsed = value.trim().parse::<usize>().map_err(|_| {
            invalid(
                field,
                value,
                ConfigErrorType::InvalidFormat,
                "Invalid unsigned integer format".to_string(),
                "Use a valid positive integer number".to_string(),
            )
        })?;
        check_range(field, value, i64::try_from(parsed).unwrap_or(i64::MAX), min, max)?;
        Ok(parsed)
    }

    /// Validate enumerated values (case-insensitive), returning the lower-cased value
    pub fn validate_enum(
        field: &str,
        value: &str,
        valid_values: &[&str],
    ) -> ValidationResult<String> {
        let lowered = value.trim().to_lowercase();
        if valid_values.iter().any(|v| v.to_lowercase() == lowered) {
            Ok(lowered)
        } else {
            Err(invalid(
                field,
                value,
                ConfigErrorType::InvalidValue,
                format!("Invalid value, must be one of: {}", valid_values.join(", ")),
                format!("Use one of: {}", valid_values.join(", ")),
            ))
        }
    }

    /// Validate IP address
    pub fn validate_ip_address(field: &str, value: &str) -> ValidationResult<IpAddr> {
        IpAddr::from_str(value.trim()).map_err(|_| {
            invalid(
                field,
                value,
                ConfigErrorType::InvalidFormat,
                "Invalid IP address format".to_string(),
                "Use a valid IPv4 or IPv6 address (e.g., 0.0.0.0 or ::1)".to_string(),
            )
        })
    }

    /// Validate port number
    pub fn validate_port(field: &str, value: &str) -> ValidationResult<u16> {
        let port = value.trim().parse::<u16>().map_err(|_| {
            invalid(
                field,
                value,
                ConfigErrorType::InvalidFormat,
                "Invalid port number format".to_string(),
                "Use a number between 1 and 65535".to_string(),
            )
        })?;

        if port == 0 {
            return Err(invalid(
                field,
                value,
                ConfigErrorType::InvalidRange,
                "Port number cannot be 0".to_string(),
                "Use a port between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }
}

/// Configuration validator for the PolyVoice API
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the process environment and build the runtime configuration
    pub fn validate_and_load() -> Result<ApiConfig, ValidationResults> {
        Self::validate_with(|key| env::var(key).ok())
    }

    /// Validate parameters read through `lookup` and build the runtime configuration
    pub fn validate_with<F>(lookup: F) -> Result<ApiConfig, ValidationResults>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut results = ValidationResults::new();
        let mut config = ApiConfig::default();

        info!("Starting configuration validation...");

        for param in CONFIG_PARAMS {
            let value = lookup(param.name)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| param.default_value.map(String::from));

            let value = match value {
                Some(value) => value,
                None => {
                    if param.param_type == ConfigType::Secret {
                        results.add_warning(ConfigValidationError {
                            field: param.name.to_string(),
                            value: String::new(),
                            error_type: ConfigErrorType::Required,
                            message: format!("{} not set", param.description),
                            suggestion: Some(format!(
                                "Set {} to enable transcription",
                                param.name
                            )),
                        });
                    }
                    continue;
                }
            };

            if let Err(error) = Self::validate_and_store_parameter(param, &value, &mut config) {
                match param.validation_level {
                    ValidationLevel::Critical | ValidationLevel::Standard => {
                        results.add_error(error)
                    }
                    ValidationLevel::Warning => results.add_warning(error),
                }
            }
        }

        Self::validate_cross_dependencies(&mut results, &mut config);

        results.print_summary();

        if results.is_valid() {
            Ok(config)
        } else {
            Err(results)
        }
    }

    /// Validate a single parameter and store its value in the config struct
    fn validate_and_store_parameter(
        param: &ConfigParam,
        value: &str,
        config: &mut ApiConfig,
    ) -> ValidationResult<()> {
        match param.param_type {
            ConfigType::Secret => {
                if param.name == "OPENAI_API_KEY" {
                    config.openai_api_key = Some(SecretString::from(value.trim().to_string()));
                }
            }
            ConfigType::String => match param.name {
                "OPENAI_BASE_URL" => {
                    config.openai_base_url = value.trim().trim_end_matches('/').to_string()
                }
                "POLYVOICE_TMP_DIR" => config.temp_dir = PathBuf::from(value.trim()),
                _ => {}
            },
            ConfigType::Integer => {
                let parsed = validators::validate_integer(
                    param.name,
                    value,
                    param.min_value,
                    param.max_value,
                )?;
                // Range checks above guarantee a positive value
                let seconds = Duration::from_secs(parsed.unsigned_abs());
                match param.name {
                    "KEEPALIVE_SECONDS" => config.keep_alive = seconds,
                    "TRANSCRIPTION_TIMEOUT_SECONDS" => config.transcription_timeout = seconds,
                    _ => {}
                }
            }
            ConfigType::UnsignedInteger => {
                let parsed = validators::validate_usize(
                    param.name,
                    value,
                    param.min_value,
                    param.max_value,
                )?;
                match param.name {
                    "WORKERS" => config.workers = parsed,
                    "MAX_FILE_SIZE" => config.max_file_size = parsed,
                    _ => {}
                }
            }
            ConfigType::Boolean => {
                let parsed = validators::validate_boolean(param.name, value)?;
                if param.name == "RELOAD" {
                    config.reload = parsed;
                }
            }
            ConfigType::IpAddress => {
                let parsed = validators::validate_ip_address(param.name, value)?;
                if param.name == "HOST" {
                    config.host = parsed;
                }
            }
            ConfigType::Port => {
                let parsed = validators::validate_port(param.name, value)?;
                if param.name == "PORT" {
                    config.port = parsed;
                }
            }
            ConfigType::Enum(valid_values) => {
                let parsed = validators::validate_enum(param.name, value, valid_values)?;
                match param.name {
                    "LOG_LEVEL" => config.log_level = parsed,
                    "ENVIRONMENT" => {
                        if let Some(environment) = Environment::parse(&parsed) {
                            config.environment = environment;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Validate cross-parameter dependencies and apply profile adjustments
    fn validate_cross_dependencies(results: &mut ValidationResults, config: &mut ApiConfig) {
        if config.reload {
            results.add_warning(ConfigValidationError {
                field: "RELOAD".to_string(),
                value: "true".to_string(),
                error_type: ConfigErrorType::InvalidValue,
                message: "Hot reload is not supported by this server and will be ignored"
                    .to_string(),
                suggestion: Some("Restart the process to pick up changes".to_string()),
            });
        }

        if config.environment != Environment::Production {
            return;
        }

        if config.reload {
            config.reload = false;
        }

        if config.workers != 0 && config.workers < defaults::PRODUCTION_MIN_WORKERS {
            results.add_warning(ConfigValidationError {
                field: "WORKERS".to_string(),
                value: config.workers.to_string(),
                error_type: ConfigErrorType::InvalidRange,
                message: format!(
                    "Production profile requires at least {} workers, raising to {}",
                    defaults::PRODUCTION_MIN_WORKERS,
                    defaults::PRODUCTION_MIN_WORKERS
                ),
                suggestion: Some(format!(
                    "Set WORKERS to {} or more",
                    defaults::PRODUCTION_MIN_WORKERS
                )),
            });
            config.workers = defaults::PRODUCTION_MIN_WORKERS;
        }
    }

    /// Generate a sample configuration file with all parameters and descriptions
    pub fn generate_sample_config() -> String {
        let mut output = String::new();
        output.push_str("# PolyVoice API Configuration File\n");
        output.push_str("# Environment variables take precedence over values in this file\n\n");

        for param in CONFIG_PARAMS {
            output.push_str(&format!("# {}\n", param.description));
            match param.default_value {
                Some(default) => output.push_str(&format!("# {} = \"{}\"\n\n", param.name, default)),
                None => output.push_str(&format!("# {} = \"\"\n\n", param.name)),
            }
        }

        output
    }
}
