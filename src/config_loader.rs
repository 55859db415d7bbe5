// Configuration loader for PolyVoice API
//
// This module loads the flat TOML configuration file into the process environment
// so that the validator sees file values and environment values through one lookup.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use toml::Value;

pub const CONFIG_FILE_PATH: &str = "polyvoice_api.conf";

/// Parses flat TOML content into key-value pairs
///
/// Nested tables and arrays are skipped with a warning.
pub fn parse_config(content: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table: toml::Table = content.parse()?;
    let mut config_map = HashMap::new();

    for (key, value) in table {
        match value {
            Value::String(s) => {
                config_map.insert(key, s);
            }
            Value::Integer(i) => {
                config_map.insert(key, i.to_string());
            }
            Value::Float(f) => {
                config_map.insert(key, f.to_string());
            }
            Value::Boolean(b) => {
                config_map.insert(key, b.to_string());
            }
            _ => {
                warn!("Skipping unsupported TOML value type for key: {}", key);
            }
        }
    }

    Ok(config_map)
}

/// Loads configuration from a TOML file into the environment
///
/// Configuration precedence (highest to lowest):
/// 1. Environment variables
/// 2. Configuration file values
/// 3. Default values (applied by the validator)
///
/// Returns true if the config file was successfully loaded, false otherwise.
pub fn load_config_from(path: &Path) -> bool {
    if !path.exists() {
        debug!("Configuration file not found at: {}", path.display());
        return false;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read configuration file: {}", e);
            return false;
        }
    };

    let config_map = match parse_config(&content) {
        Ok(values) => values,
        Err(e) => {
            warn!("Failed to parse configuration file: {}", e);
            return false;
        }
    };

    for (key, value) in config_map {
        if env::var(&key).is_err() {
            debug!("Setting env var from config file: {}", key);
            env::set_var(key, value);
        } else {
            debug!("Env var already exists, skipping: {}", key);
        }
    }

    info!("Configuration loaded from {}", path.display());
    true
}

/// Loads the default configuration file from the working directory
pub fn load_config() -> bool {
    load_config_from(Path::new(CONFIG_FILE_PATH))
}
