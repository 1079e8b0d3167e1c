//! Ports through which the controller reaches its collaborators

use async_trait::async_trait;

use crate::errors::StorageError;

/// Answer of the verification service for a well-formed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The code is correct; the session may proceed
    Accepted,
    /// The service rejected the code, optionally explaining why
    Rejected { message: Option<String> },
}

/// Trait for the external code verification service
#[async_trait]
pub trait VerificationServiceTrait: Send + Sync {
    /// Verify `code` for `email`
    ///
    /// `Err` means the service could not give an answer (network or server
    /// failure); an explicit rejection is `Ok(VerifyOutcome::Rejected)`.
    async fn verify_code(&self, email: &str, code: &str) -> Result<VerifyOutcome, String>;
}

/// Trait for the external code issuance service
#[async_trait]
pub trait IssuanceServiceTrait: Send + Sync {
    /// Deliver a new code to `email` out of band
    async fn send_code(&self, email: &str) -> Result<(), String>;
}

/// Synchronous key-value storage scoped to the host
///
/// Only single-key operations are atomic.
pub trait DurableStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Host navigation used for the post-verification handoff
pub trait Navigator: Send + Sync {
    /// Hand control to `url`
    fn navigate(&self, url: &str);
}
