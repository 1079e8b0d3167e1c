//! Authentication service HTTP client
//!
//! Implements both the verification and the issuance port over JSON POST
//! requests. Explicit rejections (400, 401, 403, 422) are reported as
//! `VerifyOutcome::Rejected` so they count as failed attempts; every other
//! failure is a transport error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use cg_core::services::{IssuanceServiceTrait, VerificationServiceTrait, VerifyOutcome};
use cg_shared::config::AuthEndpointConfig;
use cg_shared::validation::mask_email;

use crate::InfrastructureError;

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    email: &'a str,
}

/// Client for the external authentication service
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: Client,
    config: AuthEndpointConfig,
}

impl HttpAuthClient {
    /// Create a client with the configured request timeout
    pub fn new(config: AuthEndpointConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            base_url = %config.base_url,
            event = "auth_client_ready",
            "Authentication service client initialized"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AuthEndpointConfig {
        &self.config
    }

    /// POST a JSON body and return the status with the raw response text
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(StatusCode, String), String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(url = url, error = %e, event = "auth_request_failed", "Authentication service request failed");
                format!("Request to authentication service failed: {}", e)
            })?;

        let status = response.status();
        // An unreadable body still leaves the status meaningful
        let text = response.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

/// Map a verification response to the port's outcome
pub fn classify_verify_response(status: StatusCode, body: &str) -> Result<VerifyOutcome, String> {
    if status.is_success() {
        return Ok(VerifyOutcome::Accepted);
    }

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => Ok(VerifyOutcome::Rejected {
            message: extract_message(body),
        }),
        _ => Err(describe_failure(status, body)),
    }
}

/// Pull a human readable message out of a JSON error body
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match extract_message(body) {
        Some(message) => format!("Authentication service returned {}: {}", status, message),
        None => format!("Authentication service returned {}", status),
    }
}

#[async_trait]
impl VerificationServiceTrait for HttpAuthClient {
    async fn verify_code(&self, email: &str, code: &str) -> Result<VerifyOutcome, String> {
        let url = self.config.verify_url();
        debug!(email = %mask_email(email), event = "auth_verify_request", "Posting verification code");

        let (status, body) = self.post_json(&url, &VerifyRequest { email, code }).await?;
        let outcome = classify_verify_response(status, &body);

        match &outcome {
            Ok(VerifyOutcome::Accepted) => {
                debug!(email = %mask_email(email), event = "auth_verify_accepted", "Code accepted")
            }
            Ok(VerifyOutcome::Rejected { .. }) => {
                debug!(email = %mask_email(email), status = status.as_u16(), event = "auth_verify_rejected", "Code rejected")
            }
            Err(message) => {
                warn!(email = %mask_email(email), status = status.as_u16(), error = %message, event = "auth_verify_failed", "Verification request failed")
            }
        }
        outcome
    }
}

#[async_trait]
impl IssuanceServiceTrait for HttpAuthClient {
    async fn send_code(&self, email: &str) -> Result<(), String> {
        let url = self.config.send_url();
        debug!(email = %mask_email(email), event = "auth_send_request", "Requesting code issuance");

        let (status, body) = self.post_json(&url, &SendRequest { email }).await?;
        if status.is_success() {
            info!(email = %mask_email(email), event = "auth_code_sent", "New code issued");
            Ok(())
        } else {
            let message = describe_failure(status, &body);
            warn!(email = %mask_email(email), status = status.as_u16(), error = %message, event = "auth_send_failed", "Code issuance failed");
            Err(message)
        }
    }
}
