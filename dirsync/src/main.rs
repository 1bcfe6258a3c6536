//! Run one identity sync pass against the configured directory sources and
//! exit. Scheduling repeated passes is an external concern.
use envconfig::Envconfig;
use eyre::Result;
use tracing::{error, info};

use dirsync::config::Config;
use dirsync_core::SyncPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let pipeline = SyncPipeline::new(config.sync_config()).await?;

    if config.run_migrations {
        pipeline.run_migrations().await?;
    }

    // Fetch failures were already absorbed inside the run; an error here
    // means the upsert transaction (or the sweep) failed and nothing was
    // committed, which a supervising scheduler should get to see.
    match pipeline.run_once().await {
        Ok(report) => {
            info!(
                "sync complete: {}/{} sources answered, {} fetched, {} missing upn, {} upserted, {} swept",
                report.sources_total - report.sources_failed,
                report.sources_total,
                report.records_fetched,
                report.records_missing_upn,
                report.records_upserted,
                report.records_deleted,
            );
            Ok(())
        }
        Err(e) => {
            error!("sync run failed: {}", e);
            Err(e.into())
        }
    }
}
