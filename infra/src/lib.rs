//! # Infrastructure Layer
//!
//! Concrete adapters for the ports declared by `cg_core`:
//! - **HTTP**: reqwest client for the external authentication service
//! - **Storage**: in-memory, JSON file and Redis durable storage
//! - **Navigation**: handoff targets for the post-verification redirect
//!
//! ## Features
//!
//! - `redis-store`: Enable the Redis storage backend (default)

use std::sync::Arc;

use cg_core::services::DurableStorage;
use tracing::info;

// Re-export core types for convenience
pub use cg_core::errors::*;

/// HTTP client for the authentication service
pub mod http;

/// Navigation handoff targets
pub mod navigation;

/// Durable storage backends
pub mod storage;

pub use http::HttpAuthClient;
pub use navigation::{LoggingNavigator, RecordingNavigator};
pub use storage::{create_storage, FileStorage, InMemoryStorage};
#[cfg(feature = "redis-store")]
pub use storage::RedisStorage;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration for infrastructure adapters
    //!
    //! Built from the layered [`AppConfig`]; this crate reads no environment
    //! variables of its own.

    use cg_shared::config::{AppConfig, AuthEndpointConfig, StorageConfig};
    use serde::{Deserialize, Serialize};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Authentication service endpoints
        pub auth: AuthEndpointConfig,
        /// Durable storage configuration
        pub storage: StorageConfig,
    }

    impl From<&AppConfig> for InfrastructureConfig {
        fn from(config: &AppConfig) -> Self {
            Self {
                auth: config.auth.clone(),
                storage: config.storage.clone(),
            }
        }
    }

}

/// Adapters wired from configuration
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Verification and issuance client
    pub auth_client: Arc<HttpAuthClient>,
    /// Durable storage, `None` when the backend could not be opened
    pub storage: Option<Arc<dyn DurableStorage>>,
}

/// Build the infrastructure adapters
///
/// A storage backend that cannot be opened is not an error: the controller
/// falls back to in-memory timers.
pub fn initialize(
    config: &config::InfrastructureConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    info!(event = "infra_init", "Initializing infrastructure services");

    let auth_client = Arc::new(HttpAuthClient::new(config.auth.clone())?);
    let storage = create_storage(&config.storage);

    info!(
        event = "infra_ready",
        persistent = storage.is_some(),
        "Infrastructure services initialized"
    );

    Ok(InfrastructureServices {
        auth_client,
        storage,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Redis storage error
    #[cfg(feature = "redis-store")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Local file error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StorageError {
    fn from(error: InfrastructureError) -> Self {
        StorageError::Backend(error.to_string())
    }
}
