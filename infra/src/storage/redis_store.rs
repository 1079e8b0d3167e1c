//! Redis storage
//!
//! Synchronous `GET`/`SET`/`DEL` over a lazily (re)established connection.
//! Keys are written without expiry; the controller removes them itself.
//!
//! Every call blocks the calling thread, including on a tokio worker, for at
//! most `CONNECT_TIMEOUT` plus `COMMAND_TIMEOUT`. Async hosts that cannot
//! tolerate that should use the `file` or `memory` backend; `file` is the
//! configured default.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use redis::{Client, Commands, Connection};
use tracing::{debug, info, warn};

use cg_core::errors::StorageError;
use cg_core::services::DurableStorage;

use crate::InfrastructureError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Read and write timeout applied to every command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Storage backed by a Redis server
pub struct RedisStorage {
    client: Client,
    connection: Mutex<Option<Connection>>,
}

impl RedisStorage {
    /// Connect to `url`, failing fast when the server is unreachable
    pub fn connect(url: &str) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(url), event = "redis_connect", "Connecting session storage to Redis");

        let client = Client::open(url)?;
        let connection = open_connection(&client)?;

        Ok(Self {
            client,
            connection: Mutex::new(Some(connection)),
        })
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T, StorageError> {
        let mut slot = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            debug!(event = "redis_reconnect", "Re-establishing Redis connection");
            *slot = Some(open_connection(&self.client).map_err(backend_error)?);
        }
        let Some(connection) = slot.as_mut() else {
            return Err(StorageError::Unavailable);
        };

        op(connection).map_err(|e| {
            if e.is_connection_dropped() || e.is_io_error() {
                // Drop the broken connection so the next call reconnects
                *slot = None;
            }
            warn!(error = %e, event = "redis_command_failed", "Redis command failed");
            backend_error(e)
        })
    }
}

impl DurableStorage for RedisStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_connection(|conn| conn.get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_connection(|conn| conn.set(key, value))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_connection(|conn| conn.del(key))
    }
}

/// Connect with bounded connect, read and write times
fn open_connection(client: &Client) -> redis::RedisResult<Connection> {
    let connection = client.get_connection_with_timeout(CONNECT_TIMEOUT)?;
    connection.set_read_timeout(Some(COMMAND_TIMEOUT))?;
    connection.set_write_timeout(Some(COMMAND_TIMEOUT))?;
    Ok(connection)
}

fn backend_error(e: redis::RedisError) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Mask the password in a Redis URL for logging
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
