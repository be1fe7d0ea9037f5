//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::AppConfig;
use crate::store::{BehaviorLog, NonceStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Replay protection
    pub nonces: Arc<NonceStore>,

    /// Accepted submissions
    pub log: Arc<BehaviorLog>,

    /// Request counters
    pub stats: Arc<IntakeStats>,

    /// Process start, for uptime
    pub started_at: Instant,
}

/// Runtime counters
#[derive(Default)]
pub struct IntakeStats {
    pub accepted: AtomicU64,
    pub replays_blocked: AtomicU64,
    pub missing_nonce: AtomicU64,
    pub store_errors: AtomicU64,
}

impl IntakeStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

impl AppState {
    /// Create application state, connecting to Redis when configured
    pub async fn new(config: AppConfig) -> Result<Self> {
        let nonces = match config.redis_url.as_deref() {
            Some(url) => NonceStore::redis(url, config.nonce_ttl_secs).await?,
            None => NonceStore::memory(),
        };
        Ok(Self::with_store(config, nonces))
    }

    /// Assemble state around an existing nonce store
    pub fn with_store(config: AppConfig, nonces: NonceStore) -> Self {
        let log = Arc::new(BehaviorLog::new(config.log_path.clone()));
        Self {
            config,
            nonces: Arc::new(nonces),
            log,
            stats: Arc::new(IntakeStats::default()),
            started_at: Instant::now(),
        }
    }
}
