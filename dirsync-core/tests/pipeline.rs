use std::time::Duration;

use chrono::Utc;
use dirsync_core::{
    DirectoryClient, IdentityStore, SourceSettings, SyncPipeline, SyncSettings,
};
use sqlx::PgPool;

mod common;
use common::{fetch_timestamps, identity, row_count};

fn source_settings(server_url: &str, api_keys: &[&str]) -> SourceSettings {
    SourceSettings {
        query_url: format!("{server_url}/api/user/query"),
        operate_name: "GetUsers".to_string(),
        encrypt_password: "shared-secret".to_string(),
        api_keys: api_keys.iter().map(|k| k.to_string()).collect(),
        request_timeout: Duration::from_secs(5),
    }
}

fn pipeline(db: PgPool, settings: &SourceSettings) -> SyncPipeline {
    SyncPipeline::from_parts(
        DirectoryClient::new(settings),
        IdentityStore::new(db),
        settings.api_keys.clone(),
        SyncSettings::default(),
    )
}

#[sqlx::test]
async fn test_end_to_end_last_source_wins(db: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/user/query")
        .match_header("x-api-key", "key-one-0001")
        .with_status(200)
        .with_body(
            r#"{"code": 999, "data": [
                {"userPrincipalName": "a@example.edu", "department": "Physics"},
                {"displayName": "No Upn At All"}
            ]}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/api/user/query")
        .match_header("x-api-key", "key-two-0002")
        .with_status(200)
        .with_body(
            r#"{"code": 999, "data": [
                {"userPrincipalName": "a@example.edu", "department": "Chemistry"}
            ]}"#,
        )
        .create_async()
        .await;

    let settings = source_settings(&server.url(), &["key-one-0001", "key-two-0002"]);
    let report = pipeline(db.clone(), &settings).run_once().await.unwrap();

    assert_eq!(report.sources_total, 2);
    assert_eq!(report.sources_failed, 0);
    assert_eq!(report.records_fetched, 3);
    assert_eq!(report.records_missing_upn, 1);
    assert_eq!(report.records_upserted, 2);
    assert_eq!(report.records_deleted, 0);

    // Both sources reported a@example.edu; the later source's value sticks.
    assert_eq!(row_count(&db).await, 1);
    let department: Option<String> =
        sqlx::query_scalar("SELECT department FROM user_infos WHERE upn = $1")
            .bind("a@example.edu")
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(department.as_deref(), Some("Chemistry"));

    let (created_at, updated_at) = fetch_timestamps(&db, "a@example.edu").await;
    assert_eq!(created_at, updated_at);
}

#[sqlx::test]
async fn test_second_run_updates_without_duplicating(db: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/user/query")
        .with_status(200)
        .with_body(r#"{"data": [{"userPrincipalName": "a@example.edu"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let settings = source_settings(&server.url(), &["key-one-0001"]);
    let pipeline = pipeline(db.clone(), &settings);

    pipeline.run_once().await.unwrap();
    let (first_created, first_updated) = fetch_timestamps(&db, "a@example.edu").await;

    pipeline.run_once().await.unwrap();
    let (second_created, second_updated) = fetch_timestamps(&db, "a@example.edu").await;

    assert_eq!(row_count(&db).await, 1);
    assert_eq!(first_created, second_created);
    assert!(second_updated > first_updated);
}

#[sqlx::test]
async fn test_total_fetch_failure_still_completes_and_sweeps(db: PgPool) {
    // Seed a row old enough to age out, as if it came from an earlier run.
    let store = IdentityStore::new(db.clone());
    store
        .upsert_batch(
            &[identity("stale@example.edu")],
            Utc::now() - chrono::Duration::days(8),
        )
        .await
        .unwrap();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/user/query")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let settings = source_settings(&server.url(), &["key-one-0001", "key-two-0002"]);
    let report = pipeline(db.clone(), &settings).run_once().await.unwrap();

    assert_eq!(report.sources_failed, 2);
    assert_eq!(report.records_fetched, 0);
    assert_eq!(report.records_upserted, 0);
    assert_eq!(report.records_deleted, 1);
    assert_eq!(row_count(&db).await, 0);
}

#[sqlx::test]
async fn test_partial_failure_still_writes_the_healthy_source(db: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/user/query")
        .match_header("x-api-key", "good-key-0001")
        .with_status(200)
        .with_body(r#"{"data": [{"userPrincipalName": "a@example.edu"}]}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/user/query")
        .match_header("x-api-key", "bad-key-0002")
        .with_status(401)
        .create_async()
        .await;

    let settings = source_settings(&server.url(), &["good-key-0001", "bad-key-0002"]);
    let report = pipeline(db.clone(), &settings).run_once().await.unwrap();

    assert_eq!(report.sources_failed, 1);
    assert_eq!(report.records_upserted, 1);
    assert_eq!(row_count(&db).await, 1);
}

#[sqlx::test]
async fn test_group_tags_round_trip_through_the_store(db: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/user/query")
        .with_status(200)
        .with_body(
            r#"{"data": [{
                "userPrincipalName": "a@example.edu",
                "memberof": "CN=Physics Dept,OU=Groups,DC=example,DC=edu,CN=All Staff,OU=Groups,DC=example,DC=edu"
            }]}"#,
        )
        .create_async()
        .await;

    let settings = source_settings(&server.url(), &["key-one-0001"]);
    pipeline(db.clone(), &settings).run_once().await.unwrap();

    let tags: Vec<String> = sqlx::query_scalar("SELECT tags FROM user_infos WHERE upn = $1")
        .bind("a@example.edu")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(tags, vec!["Physics Dept", "All Staff"]);
}
