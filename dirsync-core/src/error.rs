use thiserror::Error;

/// Enumeration of per-source fetch failures.
/// These are always recovered by the orchestrator: a failing source is
/// logged and excluded from the batch, never escalated.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("directory request failed: {error}")]
    Request { error: reqwest::Error },
    #[error("directory endpoint returned status {status}")]
    Status { status: reqwest::StatusCode },
    #[error("could not decode directory response: {error}")]
    Decode { error: reqwest::Error },
    #[error("directory response carried no record list (code: {code:?}, msg: {msg:?})")]
    MissingData {
        code: Option<i64>,
        msg: Option<String>,
    },
}

/// Enumeration of database errors for a sync run.
/// Errors originate from sqlx and are wrapped to carry the command that
/// failed, since the raw error alone rarely names it.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("pool creation failed with: {error}")]
    PoolCreationError { error: sqlx::Error },
    #[error("{command} query failed with: {error}")]
    QueryError { command: String, error: sqlx::Error },
    #[error("transaction {command} failed with: {error}")]
    TransactionError { command: String, error: sqlx::Error },
    #[error("migration failed with: {error}")]
    MigrateError { error: sqlx::migrate::MigrateError },
}
