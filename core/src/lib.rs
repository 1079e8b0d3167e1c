//! # CodeGuard Core
//!
//! Domain layer of the CodeGuard sign-in flow: the verification session
//! entity, code value objects, error types, the ports through which external
//! services are reached, and the OTP verification controller.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
