//! Single-use attempt tokens.

use std::collections::HashSet;

use agni_common::AgniError;
use agni_common::constants::redis_keys::NONCE_PREFIX;
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

/// Remembers which nonces have been used
pub enum NonceStore {
    /// Process-local set; forgotten on restart
    Memory(Mutex<HashSet<String>>),

    /// Shared across intake nodes, entries expire after `ttl_secs`
    Redis {
        conn: ConnectionManager,
        ttl_secs: u64,
    },
}

impl NonceStore {
    pub fn memory() -> Self {
        Self::Memory(Mutex::new(HashSet::new()))
    }

    /// Connect to Redis with connection manager (handles reconnection)
    pub async fn redis(url: &str, ttl_secs: u64) -> Result<Self> {
        let client = redis::Client::open(url).context("Failed to create Redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self::Redis { conn, ttl_secs })
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis { .. } => "redis",
        }
    }

    /// Atomically mark `nonce` as used.
    ///
    /// Returns `Ok(false)` if it had already been claimed.
    pub async fn claim(&self, nonce: &str) -> Result<bool, AgniError> {
        match self {
            Self::Memory(seen) => Ok(seen.lock().await.insert(nonce.to_string())),
            Self::Redis { conn, ttl_secs } => {
                let mut conn = conn.clone();
                let key = format!("{NONCE_PREFIX}{nonce}");

                // SET NX replies OK when the key was created, nil when it existed
                let reply: Option<String> = redis::cmd("SET")
                    .arg(&key)
                    .arg(1)
                    .arg("NX")
                    .arg("EX")
                    .arg(*ttl_secs)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| AgniError::Store(e.to_string()))?;

                Ok(reply.is_some())
            }
        }
    }

    /// Give back a claimed nonce so the same attempt can be submitted again.
    pub async fn release(&self, nonce: &str) -> Result<(), AgniError> {
        match self {
            Self::Memory(seen) => {
                seen.lock().await.remove(nonce);
                Ok(())
            }
            Self::Redis { conn, .. } => {
                let mut conn = conn.clone();
                let _: i64 = redis::cmd("DEL")
                    .arg(format!("{NONCE_PREFIX}{nonce}"))
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| AgniError::Store(e.to_string()))?;
                Ok(())
            }
        }
    }

    /// Whether the backend is reachable
    pub async fn ping(&self) -> bool {
        match self {
            Self::Memory(_) => true,
            Self::Redis { conn, .. } => {
                let mut conn = conn.clone();
                let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
                result.is_ok()
            }
        }
    }
}
