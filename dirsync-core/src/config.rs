use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::{pool::PoolOptions, PgPool};

/// Rows whose `updated_at` is older than this many days are swept after a
/// successful upsert, unless configured otherwise.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

// A pool config object, designed to be passable across API boundaries
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolConfig {
    pub db_url: String,
    pub max_connections: Option<u32>,         // Default to 4
    pub min_connections: Option<u32>,         // Default to 1
    pub acquire_timeout_seconds: Option<u64>, // Default to 30
    pub max_lifetime_seconds: Option<u64>,    // Default to 300
    pub idle_timeout_seconds: Option<u64>,    // Default to 60
}

impl PoolConfig {
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let builder = PoolOptions::new()
            .max_connections(self.max_connections.unwrap_or(4))
            .min_connections(self.min_connections.unwrap_or(1))
            .max_lifetime(Duration::from_secs(
                self.max_lifetime_seconds.unwrap_or(300),
            ))
            .idle_timeout(Duration::from_secs(self.idle_timeout_seconds.unwrap_or(60)))
            .acquire_timeout(Duration::from_secs(
                self.acquire_timeout_seconds.unwrap_or(30),
            ));

        builder.connect(&self.db_url).await
    }
}

/// Settings for querying the directory endpoint. One query is made per
/// entry in `api_keys`; the other fields are shared by every query.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub query_url: String,
    /// Operation descriptor sent in the request body.
    pub operate_name: String,
    /// Opaque shared secret sent in the request body.
    pub encrypt_password: String,
    pub api_keys: Vec<String>,
    /// Per-call deadline applied by the HTTP client.
    pub request_timeout: Duration,
}

/// Settings for the run itself.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Maximum age of `updated_at` before a row is considered stale.
    pub retention: chrono::Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS),
        }
    }
}

/// Everything a pipeline run needs, threaded explicitly through the
/// constructors. There is no ambient process-wide state.
pub struct SyncConfig {
    pub pool: PoolConfig,
    pub source: SourceSettings,
    pub settings: SyncSettings,
}
