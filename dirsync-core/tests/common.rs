use chrono::{DateTime, Duration, Utc};
use dirsync_core::UserIdentity;
use sqlx::PgPool;

#[allow(dead_code)]
pub fn identity(upn: &str) -> UserIdentity {
    UserIdentity {
        upn: upn.to_string(),
        email: Some(upn.to_string()),
        display_name: Some("Test Person".to_string()),
        department: Some("Physics".to_string()),
        tags: vec!["All Staff".to_string()],
        ..UserIdentity::default()
    }
}

#[allow(dead_code)]
pub fn dates_match(left: &DateTime<Utc>, right: &DateTime<Utc>) -> bool {
    // Roundtripping a datetime to PG can cause sub-ms differences, so we
    // need to check within a margin of error
    let diff = *left - *right;
    diff.abs() < Duration::milliseconds(1)
}

#[allow(dead_code)]
pub async fn row_count(db: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_infos")
        .fetch_one(db)
        .await
        .expect("count query should succeed")
}

#[allow(dead_code)]
pub async fn fetch_timestamps(db: &PgPool, upn: &str) -> (DateTime<Utc>, DateTime<Utc>) {
    sqlx::query_as("SELECT created_at, updated_at FROM user_infos WHERE upn = $1")
        .bind(upn)
        .fetch_one(db)
        .await
        .expect("row should exist")
}
