use futures::future::join_all;
use tracing::{error, info};

use crate::source::{redact_key, DirectoryClient};
use crate::types::RawUserRecord;

/// Result of one fan-out: records concatenated in call order, plus how many
/// sources failed. A total failure is an empty batch rather than an error;
/// one bad credential must not block the whole sync.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawUserRecord>,
    pub sources_failed: usize,
}

/// Query every configured credential concurrently and join the full set.
///
/// All calls are polled within the caller's task, so cancelling the caller
/// drops every in-flight request; each call carries the client's own
/// per-request deadline. Failed calls are logged with a redacted credential
/// suffix and excluded. No cross-source deduplication happens here:
/// duplicate UPNs are resolved by the upsert's last-write-wins semantics,
/// so concatenation order is load-bearing.
pub async fn fetch_all(client: &DirectoryClient, api_keys: &[String]) -> FetchOutcome {
    let calls = api_keys.iter().map(|key| client.fetch_users(key));
    let results = join_all(calls).await;

    let mut outcome = FetchOutcome::default();
    for (key, result) in api_keys.iter().zip(results) {
        match result {
            Ok(records) => {
                info!(
                    "fetched {} records from source {}",
                    records.len(),
                    redact_key(key)
                );
                outcome.records.extend(records);
            }
            Err(e) => {
                error!("source {} failed: {}", redact_key(key), e);
                outcome.sources_failed += 1;
            }
        }
    }

    outcome
}
