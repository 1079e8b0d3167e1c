//! Configuration module with sub-modules per concern
//!
//! - `auth` - External authentication service endpoints
//! - `environment` - Environment detection and logging configuration
//! - `storage` - Durable session storage backend
//! - `verification` - OTP verification policy and callback handoff

pub mod auth;
pub mod environment;
pub mod storage;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use auth::AuthEndpointConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use storage::{StorageBackend, StorageConfig};
pub use verification::{CallbackConfig, VerificationConfig};

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "CODEGUARD";

/// Upper bound for every verification duration (one day)
pub const MAX_DURATION_SECONDS: i64 = 86_400;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Verification policy
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Authentication service endpoints
    #[serde(default)]
    pub auth: AuthEndpointConfig,

    /// Durable storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults for a given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            verification: VerificationConfig::default(),
            auth: AuthEndpointConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from the working directory and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration layering defaults, an optional per-environment file and
    /// `CODEGUARD__*` environment variables (`__` separates nested keys)
    pub fn load_from(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let defaults = config::Config::try_from(&Self::for_environment(environment))?;

        let file_name = match config_dir {
            Some(dir) => dir.join(environment.config_file()).to_string_lossy().into_owned(),
            None => environment.config_file().to_string(),
        };

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AppConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject policies the controller cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.verification;
        if v.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "verification.max_attempts must be at least 1".to_string(),
            });
        }
        if v.code_validity_seconds <= 0 || v.lockout_seconds <= 0 || v.resend_cooldown_seconds < 0 {
            return Err(ConfigError::Invalid {
                message: "verification durations must be positive".to_string(),
            });
        }
        if [v.code_validity_seconds, v.lockout_seconds, v.resend_cooldown_seconds]
            .iter()
            .any(|seconds| *seconds > MAX_DURATION_SECONDS)
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "verification durations must not exceed {} seconds",
                    MAX_DURATION_SECONDS
                ),
            });
        }
        if !v.callback.template.contains("{code}") {
            return Err(ConfigError::Invalid {
                message: "verification.callback.template must contain {code}".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CLEAN_ENV: [(&str, Option<&str>); 3] =
        [("ENVIRONMENT", None), ("ENV", None), ("RUST_ENV", None)];

    #[test]
    fn test_load_defaults() {
        temp_env::with_vars(CLEAN_ENV, || {
            let dir = tempfile::tempdir().unwrap();
            let config = AppConfig::load_from(Some(dir.path())).unwrap();
            assert_eq!(config.environment, Environment::Development);
            assert_eq!(config.verification.max_attempts, 5);
            assert_eq!(config.verification.code_validity_seconds, 600);
            assert_eq!(config.verification.lockout_seconds, 300);
            assert_eq!(config.verification.resend_cooldown_seconds, 60);
            assert_eq!(config.storage.backend, StorageBackend::File);
        });
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("ENVIRONMENT", None),
                ("ENV", None),
                ("RUST_ENV", None),
                ("CODEGUARD__VERIFICATION__MAX_ATTEMPTS", Some("3")),
                ("CODEGUARD__AUTH__BASE_URL", Some("https://auth.example.com")),
                ("CODEGUARD__STORAGE__BACKEND", Some("memory")),
            ],
            || {
                let dir = tempfile::tempdir().unwrap();
                let config = AppConfig::load_from(Some(dir.path())).unwrap();
                assert_eq!(config.verification.max_attempts, 3);
                assert_eq!(config.auth.base_url, "https://auth.example.com");
                assert_eq!(config.storage.backend, StorageBackend::Memory);
            },
        );
    }

    #[test]
    fn test_file_overrides() {
        temp_env::with_vars(CLEAN_ENV, || {
            let dir = tempfile::tempdir().unwrap();
            let mut file = std::fs::File::create(dir.path().join("config.development.toml")).unwrap();
            writeln!(file, "[verification]\nlockout_seconds = 120\n\n[verification.callback]\nprovider = \"otp\"").unwrap();

            let config = AppConfig::load_from(Some(dir.path())).unwrap();
            assert_eq!(config.verification.lockout_seconds, 120);
            assert_eq!(config.verification.callback.provider, "otp");
            assert_eq!(config.verification.max_attempts, 5);
        });
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        config.verification.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_bounds_durations_to_one_day() {
        let mut config = AppConfig::default();
        config.verification.lockout_seconds = 100_000_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = AppConfig::default();
        config.verification.resend_cooldown_seconds = MAX_DURATION_SECONDS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.verification.code_validity_seconds = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.verification.lockout_seconds = MAX_DURATION_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override_with_oversized_lockout_is_rejected() {
        temp_env::with_vars(
            [
                ("ENVIRONMENT", None),
                ("ENV", None),
                ("RUST_ENV", None),
                ("CODEGUARD__VERIFICATION__LOCKOUT_SECONDS", Some("100000000000000")),
            ],
            || {
                let dir = tempfile::tempdir().unwrap();
                let result = AppConfig::load_from(Some(dir.path()));
                assert!(matches!(result, Err(ConfigError::Invalid { .. })));
            },
        );
    }

    #[test]
    fn test_validate_rejects_template_without_code() {
        let mut config = AppConfig::default();
        config.verification.callback.template = "/done".to_string();
        assert!(config.validate().is_err());
    }
}
