//! Domain-specific error types and error handling.

mod types;

pub use types::{ControllerError, StorageError, VerificationError};

pub type VerificationResult<T> = Result<T, VerificationError>;
