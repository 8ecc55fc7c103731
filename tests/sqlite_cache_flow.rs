mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use std::sync::Arc;

use common::{CountingSigner, TOKEN, create_test_state, location, relaxed_limit};
use media_resolver::config::S3Config;
use media_resolver::infrastructure::cache::{LinkCache, SqliteCache};
use media_resolver::infrastructure::storage::S3Signer;
use media_resolver::routes::app_router;

const KEY: &str = "media_cache:images/a.jpg";

async fn stored_value(cache: &SqliteCache, key: &str) -> Option<String> {
    sqlx::query_scalar("SELECT value FROM cache WHERE key = ?")
        .bind(key)
        .fetch_optional(cache.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_scenario_against_sqlite() {
    let cache = Arc::new(SqliteCache::in_memory(3600).await.unwrap());
    let signer = Arc::new(CountingSigner::default());
    let state = create_test_state(cache.clone(), signer.clone(), relaxed_limit());
    let server = TestServer::new(app_router(state)).unwrap();

    let first = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;
    first.assert_status(StatusCode::FOUND);
    let u1 = location(&first);
    assert_eq!(stored_value(&cache, KEY).await, Some(u1.clone()));

    let second = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;
    assert_eq!(location(&second), u1);
    assert_eq!(signer.calls(), 1);

    let third = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .add_query_param("fresh", "1")
        .await;
    let u2 = location(&third);

    assert_ne!(u1, u2);
    assert_eq!(signer.calls(), 2);
    assert_eq!(stored_value(&cache, KEY).await, Some(u2));
}

#[tokio::test]
async fn test_expired_row_is_resigned() {
    let cache = Arc::new(SqliteCache::in_memory(3600).await.unwrap());
    let signer = Arc::new(CountingSigner::default());

    sqlx::query("INSERT INTO cache (key, value, expiry) VALUES (?, ?, ?)")
        .bind(KEY)
        .bind("https://s3.test/stale")
        .bind(Utc::now().timestamp() - 60)
        .execute(cache.pool())
        .await
        .unwrap();

    let state = create_test_state(cache.clone(), signer.clone(), relaxed_limit());
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status(StatusCode::FOUND);
    let url = location(&response);
    assert_ne!(url, "https://s3.test/stale");
    assert_eq!(signer.calls(), 1);
    assert_eq!(cache.get(KEY).await.unwrap(), Some(url));
}

fn minio_config() -> S3Config {
    S3Config {
        bucket: "media".to_string(),
        region: "us-east-1".to_string(),
        endpoint: Some("http://localhost:9000".to_string()),
        access_key: "minioadmin".to_string(),
        secret_key: "minioadmin".to_string(),
        path_style: true,
    }
}

#[tokio::test]
async fn test_real_signer_with_sqlite() {
    let signer = Arc::new(S3Signer::new(&minio_config(), 3600).unwrap());
    let cache = Arc::new(SqliteCache::in_memory(3600).await.unwrap());

    let state = create_test_state(cache.clone(), signer, relaxed_limit());
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "/images/a.jpg")
        .await;

    response.assert_status(StatusCode::FOUND);
    let url = location(&response);
    assert!(url.starts_with("http://localhost:9000/media/images/a.jpg?"));
    assert!(url.contains("X-Amz-Expires=3600"));

    assert_eq!(stored_value(&cache, KEY).await, Some(url));
}

#[tokio::test]
async fn test_bucket_root_is_never_signed() {
    let signer = Arc::new(S3Signer::new(&minio_config(), 3600).unwrap());
    let cache = Arc::new(SqliteCache::in_memory(3600).await.unwrap());

    let state = create_test_state(cache.clone(), signer, relaxed_limit());
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "/")
        .await;

    response.assert_status_bad_request();
    assert!(response.headers().get("location").is_none());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cache")
        .fetch_one(cache.pool())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
