//! Error types for the OTP verification flow
//!
//! Every variant carries enough context to render a user-facing message.
//! Only `Locked`, `Expired` and `TooManyAttempts` correspond to a change of
//! the session state machine; the rest are advisory.

use thiserror::Error;

/// Errors reported by the verification controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Verification code must be exactly 6 digits")]
    InvalidFormat,

    #[error("Verification locked: {remaining_seconds} seconds remaining")]
    Locked { remaining_seconds: i64 },

    #[error("Verification code expired")]
    Expired,

    #[error("Invalid verification code: {message}")]
    InvalidCode {
        message: String,
        attempts_remaining: u32,
    },

    #[error("Maximum attempts exceeded: locked for {lockout_seconds} seconds")]
    TooManyAttempts { lockout_seconds: i64 },

    #[error("Resend failed: {message}")]
    ResendFailed { message: String },

    #[error("Verification service error: {message}")]
    TransportError { message: String },
}

impl VerificationError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidFormat => "INVALID_FORMAT",
            VerificationError::Locked { .. } => "LOCKED",
            VerificationError::Expired => "EXPIRED",
            VerificationError::InvalidCode { .. } => "INVALID_CODE",
            VerificationError::TooManyAttempts { .. } => "TOO_MANY_ATTEMPTS",
            VerificationError::ResendFailed { .. } => "RESEND_FAILED",
            VerificationError::TransportError { .. } => "TRANSPORT_ERROR",
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            VerificationError::InvalidFormat => "Please enter the 6-digit code.".to_string(),
            VerificationError::Locked { remaining_seconds } => format!(
                "Too many failed attempts. Try again in {}.",
                crate::domain::format_countdown(*remaining_seconds)
            ),
            VerificationError::Expired => {
                "This code has expired. Please request a new one.".to_string()
            }
            VerificationError::InvalidCode { message, .. } => message.clone(),
            VerificationError::TooManyAttempts { lockout_seconds } => format!(
                "Too many failed attempts. Please wait {} minutes before trying again.",
                (lockout_seconds + 59) / 60
            ),
            VerificationError::ResendFailed { .. } => {
                "Could not send a new code. Please try again.".to_string()
            }
            VerificationError::TransportError { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Errors reported by durable storage backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable")]
    Unavailable,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors constructing a controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email: {email}")]
    InvalidEmail { email: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            VerificationError::InvalidFormat,
            VerificationError::Locked { remaining_seconds: 10 },
            VerificationError::Expired,
            VerificationError::InvalidCode { message: "x".into(), attempts_remaining: 1 },
            VerificationError::TooManyAttempts { lockout_seconds: 300 },
            VerificationError::ResendFailed { message: "x".into() },
            VerificationError::TransportError { message: "x".into() },
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.error_code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            VerificationError::Locked { remaining_seconds: 75 }.user_message(),
            "Too many failed attempts. Try again in 01:15."
        );
        assert_eq!(
            VerificationError::TooManyAttempts { lockout_seconds: 300 }.user_message(),
            "Too many failed attempts. Please wait 5 minutes before trying again."
        );
        assert_eq!(
            VerificationError::InvalidCode { message: "Wrong code".into(), attempts_remaining: 2 }
                .user_message(),
            "Wrong code"
        );
    }

    #[test]
    fn test_transport_message_hides_details() {
        let err = VerificationError::TransportError { message: "connection reset".into() };
        assert!(!err.user_message().contains("connection reset"));
        assert!(err.to_string().contains("connection reset"));
    }
}
