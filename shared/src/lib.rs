//! Shared utilities and common types for the CodeGuard verification services
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types and loading
//! - Tracing subscriber initialisation
//! - Utility functions (email validation, masking, digit sanitising)

pub mod config;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthEndpointConfig, CallbackConfig, ConfigError, Environment, LogFormat,
    LoggingConfig, StorageBackend, StorageConfig, VerificationConfig,
};
pub use logging::init_tracing;
pub use utils::validation;
