mod common;

use axum::http::StatusCode;
use common::{TOKEN, create_test_server, location};

const KEY: &str = "media_cache:images/a.jpg";

#[tokio::test]
async fn test_first_request_signs_and_caches() {
    let (server, cache, signer) = create_test_server();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status(StatusCode::FOUND);
    let url = location(&response);
    assert!(url.starts_with("https://s3.test/media/images/a.jpg?"));

    assert_eq!(signer.calls(), 1);
    assert_eq!(cache.sets(), 1);
    assert_eq!(cache.entry(KEY).as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn test_scenario_hit_then_forced_refresh() {
    let (server, cache, signer) = create_test_server();

    let first = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;
    first.assert_status(StatusCode::FOUND);
    let u1 = location(&first);

    let second = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;
    second.assert_status(StatusCode::FOUND);
    assert_eq!(location(&second), u1);
    assert_eq!(signer.calls(), 1);

    let third = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .add_query_param("fresh", "1")
        .await;
    third.assert_status(StatusCode::FOUND);
    let u2 = location(&third);

    assert_ne!(u1, u2);
    assert_eq!(signer.calls(), 2);
    assert_eq!(cache.clears(), 1);
    assert_eq!(cache.entry(KEY), Some(u2));
}

#[tokio::test]
async fn test_fresh_other_than_one_uses_cache() {
    let (server, cache, signer) = create_test_server();
    cache.insert(KEY, "https://s3.test/cached");

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .add_query_param("fresh", "0")
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://s3.test/cached");
    assert_eq!(signer.calls(), 0);
    assert_eq!(cache.clears(), 0);
}

#[tokio::test]
async fn test_leading_slash_shares_cache_entry() {
    let (server, cache, signer) = create_test_server();

    let first = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "/images/a.jpg")
        .await;
    let second = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    assert_eq!(location(&first), location(&second));
    assert_eq!(signer.calls(), 1);
    assert!(cache.entry(KEY).is_some());
}

#[tokio::test]
async fn test_missing_path_is_bad_request() {
    let (server, cache, signer) = create_test_server();

    let response = server.get("/media").add_query_param("token", TOKEN).await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"]["field"], "path");

    assert_eq!(cache.touched(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_empty_path_is_bad_request() {
    let (server, _cache, _signer) = create_test_server();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_bucket_root_path_is_bad_request() {
    let (server, cache, signer) = create_test_server();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "/")
        .add_query_param("fresh", "1")
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"]["field"], "path");

    assert_eq!(cache.touched(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_duplicate_path_returns_json_error() {
    let (server, cache, signer) = create_test_server();

    let response = server
        .get("/media?token=secret&path=images/a.jpg&path=images/b.jpg")
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "Invalid query string");

    assert_eq!(cache.touched(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (server, cache, signer) = create_test_server();

    let response = server
        .get("/media")
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status_unauthorized();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "unauthorized");

    assert_eq!(cache.touched(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_wrong_token_is_forbidden() {
    let (server, cache, signer) = create_test_server();

    let response = server
        .get("/media")
        .add_query_param("token", "guess")
        .add_query_param("path", "images/a.jpg")
        .add_query_param("fresh", "1")
        .await;

    response.assert_status_forbidden();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "forbidden");

    assert_eq!(cache.touched(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_auth_checked_before_path() {
    let (server, _cache, _signer) = create_test_server();

    let response = server.get("/media").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_cache_write_failure_still_redirects() {
    let (server, cache, signer) = create_test_server();
    cache.fail_sets();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status(StatusCode::FOUND);
    assert!(location(&response).contains("images/a.jpg"));
    assert_eq!(signer.calls(), 1);
    assert_eq!(cache.sets(), 1);
    assert_eq!(cache.entry(KEY), None);
}

#[tokio::test]
async fn test_cache_read_failure_is_server_error() {
    let (server, cache, signer) = create_test_server();
    cache.fail_gets();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status_internal_server_error();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "internal_error");
    assert!(!response.text().contains("connection refused"));

    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_signer_failure_is_server_error() {
    let (server, cache, signer) = create_test_server();
    signer.fail();

    let response = server
        .get("/media")
        .add_query_param("token", TOKEN)
        .add_query_param("path", "images/a.jpg")
        .await;

    response.assert_status_internal_server_error();
    assert!(!response.text().contains("SignatureDoesNotMatch"));
    assert_eq!(cache.sets(), 0);
}
