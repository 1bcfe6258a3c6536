use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

use dirsync_core::{PoolConfig, SourceSettings, SyncConfig, SyncSettings};

#[derive(Envconfig, Clone)]
pub struct Config {
    pub database_url: String,

    pub user_query_url: String,

    pub query_api_keys: ApiKeyList,

    pub operate_name: String,

    pub encrypt_password: String,

    #[envconfig(default = "30000")]
    pub request_timeout_ms: EnvMsDuration,

    #[envconfig(default = "7")]
    pub retention_days: i64,

    #[envconfig(default = "4")]
    pub max_pg_connections: u32,

    #[envconfig(default = "false")]
    pub run_migrations: bool,
}

impl Config {
    /// Assemble the per-run configuration passed into the core.
    pub fn sync_config(&self) -> SyncConfig {
        let pool = PoolConfig {
            db_url: self.database_url.clone(),
            max_connections: Some(self.max_pg_connections),
            min_connections: None,
            acquire_timeout_seconds: None,
            max_lifetime_seconds: None,
            idle_timeout_seconds: None,
        };

        let source = SourceSettings {
            query_url: self.user_query_url.clone(),
            operate_name: self.operate_name.clone(),
            encrypt_password: self.encrypt_password.clone(),
            api_keys: self.query_api_keys.0.clone(),
            request_timeout: self.request_timeout_ms.0,
        };

        let settings = SyncSettings {
            retention: chrono::Duration::days(self.retention_days),
        };

        SyncConfig {
            pool,
            source,
            settings,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}

/// A comma-separated credential list. Entries are trimmed and empty
/// segments dropped; a value with no usable entry is rejected, since a run
/// with zero sources can only ever delete data.
#[derive(Debug, Clone)]
pub struct ApiKeyList(pub Vec<String>);

#[derive(Debug, PartialEq, Eq)]
pub struct EmptyApiKeyListError;

impl FromStr for ApiKeyList {
    type Err = EmptyApiKeyListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect();

        if keys.is_empty() {
            Err(EmptyApiKeyListError)
        } else {
            Ok(ApiKeyList(keys))
        }
    }
}
