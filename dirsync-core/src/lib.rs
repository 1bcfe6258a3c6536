//! Core of the identity synchronization pipeline: fetch identity records
//! from every configured directory source, normalize them, upsert them into
//! Postgres in one transaction, then sweep rows past the retention window.

// We do this pattern (privately use a module, then re-export parts of it) so
// we can refactor the internals without breaking the public API.

// Types
mod types;
pub use types::RawUserRecord;
pub use types::SyncReport;
pub use types::UserIdentity;

// Errors
mod error;
// Per-source failures, recovered by the orchestrator
pub use error::FetchError;
// Database failures, fatal for the run
pub use error::SyncError;

// Config
mod config;
pub use config::PoolConfig;
pub use config::SourceSettings;
pub use config::SyncConfig;
pub use config::SyncSettings;
pub use config::DEFAULT_RETENTION_DAYS;

// Source client
mod source;
pub use source::redact_key;
pub use source::DirectoryClient;

// Fetch orchestrator
mod fetch;
pub use fetch::fetch_all;
pub use fetch::FetchOutcome;

// Field mapper
mod mapper;
pub use mapper::extract_group_names;
pub use mapper::map_record;

// Store (upsert + retention sweep)
mod store;
pub use store::IdentityStore;

// Pipeline
mod pipeline;
pub use pipeline::SyncPipeline;
