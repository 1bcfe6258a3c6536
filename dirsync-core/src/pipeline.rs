use chrono::Utc;
use tracing::{info, warn};

use crate::config::{SyncConfig, SyncSettings};
use crate::error::SyncError;
use crate::fetch::fetch_all;
use crate::mapper::map_record;
use crate::source::DirectoryClient;
use crate::store::IdentityStore;
use crate::types::SyncReport;

/// One run of the identity sync: fetch, map, upsert, sweep.
///
/// Stages run strictly in order and each fully materializes its output
/// before the next begins; only the fetch stage is concurrent internally.
pub struct SyncPipeline {
    client: DirectoryClient,
    store: IdentityStore,
    api_keys: Vec<String>,
    settings: SyncSettings,
}

impl SyncPipeline {
    pub async fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let pool = config
            .pool
            .connect()
            .await
            .map_err(|error| SyncError::PoolCreationError { error })?;

        let client = DirectoryClient::new(&config.source);

        Ok(Self {
            client,
            store: IdentityStore::new(pool),
            api_keys: config.source.api_keys,
            settings: config.settings,
        })
    }

    /// Assemble a pipeline from already-built parts. Better suited to tests,
    /// where the pool and endpoint are provisioned by the harness.
    pub fn from_parts(
        client: DirectoryClient,
        store: IdentityStore,
        api_keys: Vec<String>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            client,
            store,
            api_keys,
            settings,
        }
    }

    pub async fn run_migrations(&self) -> Result<(), SyncError> {
        self.store.run_migrations().await
    }

    /// Execute one full pass and return the run's counts.
    ///
    /// Fetch failures are soft: even with every source down the run still
    /// completes, writing nothing. A failed upsert transaction is hard: the
    /// sweep is skipped and the error propagates to the caller.
    pub async fn run_once(&self) -> Result<SyncReport, SyncError> {
        let synced_at = Utc::now();
        info!(
            "starting identity sync across {} sources",
            self.api_keys.len()
        );

        let outcome = fetch_all(&self.client, &self.api_keys).await;
        let fetched = outcome.records.len();
        metrics::counter!("dirsync_records_fetched").increment(fetched as u64);
        metrics::counter!("dirsync_sources_failed").increment(outcome.sources_failed as u64);
        if !self.api_keys.is_empty() && outcome.sources_failed == self.api_keys.len() {
            warn!(
                "all {} sources failed, continuing with an empty batch",
                self.api_keys.len()
            );
        }

        let identities: Vec<_> = outcome.records.into_iter().filter_map(map_record).collect();
        let missing_upn = fetched - identities.len();
        if missing_upn > 0 {
            warn!("dropped {missing_upn} records with no usable upn");
        }
        metrics::counter!("dirsync_records_rejected").increment(missing_upn as u64);

        let upserted = self.store.upsert_batch(&identities, synced_at).await?;
        metrics::counter!("dirsync_records_upserted").increment(upserted);
        info!("wrote {upserted} identity rows in one transaction");

        let deleted = self.store.delete_stale(self.settings.retention).await?;
        metrics::counter!("dirsync_records_deleted").increment(deleted);
        if deleted > 0 {
            info!("swept {deleted} identities past the retention window");
        }

        Ok(SyncReport {
            sources_total: self.api_keys.len(),
            sources_failed: outcome.sources_failed,
            records_fetched: fetched,
            records_missing_upn: missing_upn,
            records_upserted: upserted,
            records_deleted: deleted,
        })
    }
}
