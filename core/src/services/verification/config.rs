//! Configuration for the OTP verification controller

use cg_shared::config::{CallbackConfig, VerificationConfig};

use crate::domain::entities::verification_session::SessionPolicy;

/// Configuration for the OTP verification controller
#[derive(Debug, Clone, PartialEq)]
pub struct OtpControllerConfig {
    /// Attempt, expiry, lockout and cooldown numbers
    pub policy: SessionPolicy,
    /// Whether a transport failure during verification consumes an attempt
    pub count_transport_errors_as_attempts: bool,
    /// Prefix for the durable storage keys
    pub storage_key_prefix: String,
    /// Post-verification handoff
    pub callback: CallbackConfig,
}

impl Default for OtpControllerConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for OtpControllerConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            policy: SessionPolicy {
                max_attempts: config.max_attempts,
                code_validity_seconds: config.code_validity_seconds,
                lockout_seconds: config.lockout_seconds,
                resend_cooldown_seconds: config.resend_cooldown_seconds,
            },
            count_transport_errors_as_attempts: config.count_transport_errors_as_attempts,
            storage_key_prefix: config.storage_key_prefix.clone(),
            callback: config.callback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_domain_constants() {
        assert_eq!(OtpControllerConfig::default().policy, SessionPolicy::default());
        assert!(!OtpControllerConfig::default().count_transport_errors_as_attempts);
    }
}
