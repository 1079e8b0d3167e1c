//! Authentication service endpoint configuration

use serde::{Deserialize, Serialize};

/// Endpoints of the external authentication service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthEndpointConfig {
    /// Base URL of the authentication service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the code verification endpoint
    #[serde(default = "default_verify_path")]
    pub verify_path: String,

    /// Path of the code issuance (resend) endpoint
    #[serde(default = "default_send_path")]
    pub send_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AuthEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            verify_path: default_verify_path(),
            send_path: default_send_path(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl AuthEndpointConfig {
    /// Create a configuration pointing at `base_url` with default paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Full URL of the verification endpoint
    pub fn verify_url(&self) -> String {
        join_url(&self.base_url, &self.verify_path)
    }

    /// Full URL of the issuance endpoint
    pub fn send_url(&self) -> String {
        join_url(&self.base_url, &self.send_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn default_base_url() -> String {
    String::from("http://localhost:3000")
}

fn default_verify_path() -> String {
    String::from("/api/auth/verify-otp")
}

fn default_send_path() -> String {
    String::from("/api/auth/send-otp")
}

fn default_timeout() -> u64 {
    10
}
