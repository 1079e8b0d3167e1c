//! Durable storage backends for the session timer anchors

pub mod file;
pub mod memory;
#[cfg(feature = "redis-store")]
pub mod redis_store;

use std::sync::Arc;

use tracing::{info, warn};

use cg_core::services::DurableStorage;
use cg_shared::config::{StorageBackend, StorageConfig};

pub use file::FileStorage;
pub use memory::InMemoryStorage;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisStorage;

/// Open the configured backend
///
/// Returns `None` when the backend cannot be opened; the controller then keeps
/// its timers in memory only.
pub fn create_storage(config: &StorageConfig) -> Option<Arc<dyn DurableStorage>> {
    let storage: Arc<dyn DurableStorage> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
        StorageBackend::File => match FileStorage::open(&config.file_path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(
                    path = %config.file_path.display(),
                    error = %e,
                    event = "storage_open_failed",
                    "Session file unavailable, timers will not survive restarts"
                );
                return None;
            }
        },
        #[cfg(feature = "redis-store")]
        StorageBackend::Redis => match RedisStorage::connect(&config.redis_url) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(
                    error = %e,
                    event = "storage_open_failed",
                    "Redis unavailable, timers will not survive restarts"
                );
                return None;
            }
        },
        #[cfg(not(feature = "redis-store"))]
        StorageBackend::Redis => {
            warn!(
                event = "storage_open_failed",
                "Redis storage requested but the redis-store feature is disabled"
            );
            return None;
        }
    };

    info!(backend = ?config.backend, event = "storage_opened", "Session storage ready");
    Some(storage)
}
