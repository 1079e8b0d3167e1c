//! Durable session storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend for the per-email timer anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only; anchors are lost on restart
    Memory,
    /// JSON file on local disk
    File,
    /// Redis server
    Redis,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Selected backend
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// File path for the `file` backend
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Connection URL for the `redis` backend
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            file_path: default_file_path(),
            redis_url: default_redis_url(),
        }
    }
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_file_path() -> PathBuf {
    PathBuf::from(".codeguard/session.json")
}

fn default_redis_url() -> String {
    String::from("redis://localhost:6379")
}
