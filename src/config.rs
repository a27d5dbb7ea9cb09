//! Configuration loader for the `airq` command-line tool.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). The resulting [`Config`] is passed explicitly to
//! every command instead of living in module-level constants.
use std::{env, path::PathBuf};

use anyhow::{anyhow, Result};

/// Parse an optional boolean environment variable with a default value.
macro_rules! parse_env_bool {
    ($var_name:expr, $default:expr) => {
        match env::var($var_name).ok().as_deref().map(str::trim) {
            None | Some("") => $default,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => {
                return Err(anyhow!(
                    "Invalid {}: expected true/false, got '{}'",
                    $var_name,
                    other
                ))
            }
        }
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Directory holding the five JSON collections.
    pub data_dir: PathBuf,

    /// Administrator login name.
    pub admin_username: String,

    /// Administrator password.
    pub admin_password: String,

    /// Create sample data when the store is still empty.
    pub seed_sample_data: bool,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `AIRQ_DATA_DIR` – data directory (default: `data`)
/// - `AIRQ_ADMIN_USERNAME` – admin login (default: `admin`)
/// - `AIRQ_ADMIN_PASSWORD` – admin password (default: `admin123`)
/// - `AIRQ_SEED_SAMPLE_DATA` – seed sample data on first use (default: true)
///
/// Returns an error if a boolean variable holds an unrecognized value.
pub fn load_from_env() -> Result<Config> {
    // ---
    let data_dir = PathBuf::from(env_or!("AIRQ_DATA_DIR", "data"));
    let admin_username = env_or!("AIRQ_ADMIN_USERNAME", "admin");
    let admin_password = env_or!("AIRQ_ADMIN_PASSWORD", "admin123");
    let seed_sample_data = parse_env_bool!("AIRQ_SEED_SAMPLE_DATA", true);

    Ok(Config {
        data_dir,
        admin_username,
        admin_password,
        seed_sample_data,
    })
}

impl Config {
    /// Check a username/password pair against the configured admin account.
    pub fn admin_credentials_match(&self, username: &str, password: &str) -> bool {
        // ---
        username.trim() == self.admin_username && password.trim() == self.admin_password
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// The admin password is masked.
    pub fn log_config(&self) {
        // ---
        let masked_password = "*".repeat(self.admin_password.chars().count().min(8));

        tracing::debug!("Configuration loaded:");
        tracing::debug!("  AIRQ_DATA_DIR         : {}", self.data_dir.display());
        tracing::debug!("  AIRQ_ADMIN_USERNAME   : {}", self.admin_username);
        tracing::debug!("  AIRQ_ADMIN_PASSWORD   : {}", masked_password);
        tracing::debug!("  AIRQ_SEED_SAMPLE_DATA : {}", self.seed_sample_data);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn test_config() -> Config {
        // ---
        Config {
            data_dir: PathBuf::from("data"),
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            seed_sample_data: false,
        }
    }

    #[test]
    fn test_admin_credentials_match() {
        // ---
        let cfg = test_config();
        assert!(cfg.admin_credentials_match("admin", "admin123"));
        assert!(cfg.admin_credentials_match(" admin ", "admin123\n"));
        assert!(!cfg.admin_credentials_match("admin", "wrong"));
        assert!(!cfg.admin_credentials_match("root", "admin123"));
    }
}
