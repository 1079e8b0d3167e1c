//! OTP verification policy configuration module

use serde::{Deserialize, Serialize};

/// Verification policy for the OTP controller
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Maximum failed attempts before the session is locked
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Validity window of an issued code in seconds
    #[serde(default = "default_code_validity")]
    pub code_validity_seconds: i64,

    /// Lockout duration in seconds after reaching `max_attempts`
    #[serde(default = "default_lockout")]
    pub lockout_seconds: i64,

    /// Minimum seconds between two resend requests
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_seconds: i64,

    /// Whether transport failures during verification consume an attempt
    #[serde(default)]
    pub count_transport_errors_as_attempts: bool,

    /// Prefix for durable storage keys
    #[serde(default = "default_storage_key_prefix")]
    pub storage_key_prefix: String,

    /// Post-verification handoff
    #[serde(default)]
    pub callback: CallbackConfig,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            code_validity_seconds: default_code_validity(),
            lockout_seconds: default_lockout(),
            resend_cooldown_seconds: default_resend_cooldown(),
            count_transport_errors_as_attempts: false,
            storage_key_prefix: default_storage_key_prefix(),
            callback: CallbackConfig::default(),
        }
    }
}

/// Callback reference handed to the host after a successful verification
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CallbackConfig {
    /// Template with `{provider}`, `{code}`, `{email}` and `{callback_url}` placeholders
    #[serde(default = "default_callback_template")]
    pub template: String,

    /// Authentication provider identifier
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Where the host should land after the callback completes
    #[serde(default = "default_return_to")]
    pub return_to: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            template: default_callback_template(),
            provider: default_provider(),
            return_to: default_return_to(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_code_validity() -> i64 {
    600 // 10 minutes
}

fn default_lockout() -> i64 {
    300 // 5 minutes
}

fn default_resend_cooldown() -> i64 {
    60
}

fn default_storage_key_prefix() -> String {
    String::from("otp:")
}

fn default_callback_template() -> String {
    String::from("/api/auth/callback/{provider}?token={code}&email={email}&callbackUrl={callback_url}")
}

fn default_provider() -> String {
    String::from("email")
}

fn default_return_to() -> String {
    String::from("/")
}
