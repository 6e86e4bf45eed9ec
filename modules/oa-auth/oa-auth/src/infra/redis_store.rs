//! Redis-backed [`CacheStore`].

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::debug;

use crate::config::RedisConfig;
use crate::domain::error::DomainError;
use crate::domain::store::CacheStore;

/// Reconnect attempts the connection manager makes after a dropped connection.
///
/// Each attempt is bounded by `connection_timeout`, so a dead store fails a
/// command after at most `CONNECT_RETRIES + 1` timeouts.
const CONNECT_RETRIES: usize = 1;

/// Shared cache store reached over one multiplexed connection.
///
/// The connection manager reconnects on its own, at most `CONNECT_RETRIES`
/// times per dropped connection; a command that fails is reported as-is and
/// never retried here.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    /// Connect to the configured Redis instance.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the host, port or database do not form a valid address
    /// - `CacheStore` if the first connection cannot be established
    pub async fn connect(cfg: &RedisConfig) -> Result<Self, DomainError> {
        if cfg.host.is_empty() {
            return Err(DomainError::invalid_argument("redis host is empty"));
        }

        let client = redis::Client::open(cfg.connection_url())
            .map_err(|e| DomainError::invalid_argument(format!("redis address: {e}")))?;
        let conn = ConnectionManager::new_with_config(client, manager_config(cfg)).await?;

        debug!(host = %cfg.host, port = cfg.port, database = cfg.database, "Connected to redis");
        Ok(Self { conn })
    }
}

fn manager_config(cfg: &RedisConfig) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(CONNECT_RETRIES)
        .set_connection_timeout(cfg.connection_timeout)
        .set_response_timeout(cfg.response_timeout)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        let found: bool = redis::Cmd::exists(key).query_async(&mut conn).await?;
        Ok(found)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::Cmd::get(key).query_async(&mut conn).await?;
        Ok(value)
    }
}
