//! End-to-end tests through the axum router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use admin_http::config::GatewayConfig;

mod common;

fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.host = "db.local".into();
    config
}

#[tokio::test]
async fn test_missing_credentials_challenges() {
    let server = common::gateway(config());
    let response = common::send(
        &server,
        Request::builder()
            .uri("/index.php")
            .header(header::HOST, "admin.local")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"phpMyAdmin db.local\""
    );
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_authenticated_summary() {
    let server = common::gateway(config());
    let response = common::send(
        &server,
        Request::builder()
            .uri("/index.php?route=%2Fsql&db=test")
            .header(header::HOST, "admin.local")
            .header(header::AUTHORIZATION, common::basic("root", "secret"))
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let json = common::body_json(response).await;
    assert_eq!(json["request_id"], "req-42");
    assert_eq!(json["user"], "root");
    assert_eq!(json["provider"], common::available_providers()[0]);
    assert_eq!(json["method"], "GET");
    assert_eq!(json["uri"], "http://admin.local/index.php?route=%2Fsql&db=test");
    assert_eq!(json["query"]["route"], "/sql");
    assert_eq!(json["query"]["db"], "test");
    assert_eq!(json["headers"]["host"][0], "admin.local");
    assert!(json["headers"].get("authorization").is_none());
    assert!(json["parsed_body"].is_null());
}

#[tokio::test]
async fn test_form_post_parsed_body() {
    let server = common::gateway(config());
    let response = common::send(
        &server,
        Request::builder()
            .method("POST")
            .uri("/index.php")
            .header(header::HOST, "admin.local")
            .header(header::AUTHORIZATION, common::basic("root", ""))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("sql_query=SELECT+1&empty="))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["method"], "POST");
    assert_eq!(json["parsed_body"]["sql_query"], "SELECT 1");
    assert_eq!(json["parsed_body"]["empty"], "");
}

#[tokio::test]
async fn test_old_usr_forces_challenge() {
    let server = common::gateway(config());
    let response = common::send(
        &server,
        Request::builder()
            .uri("/index.php?old_usr=root")
            .header(header::HOST, "admin.local")
            .header(header::AUTHORIZATION, common::basic("root", "secret"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_redirects() {
    let mut config = config();
    config.auth.logout_url = Some("https://example.com/".into());
    let server = common::gateway(config);

    let response = common::send(
        &server,
        Request::builder()
            .uri("/logout")
            .header(header::HOST, "admin.local")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://example.com/");
}

#[tokio::test]
async fn test_body_too_large() {
    let mut config = config();
    config.security.max_body_size = 8;
    let server = common::gateway(config);

    let response = common::send(
        &server,
        Request::builder()
            .method("POST")
            .uri("/index.php")
            .header(header::HOST, "admin.local")
            .body(Body::from("this body is longer than eight bytes"))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_generated_request_ids_differ() {
    let server = common::gateway(config());
    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = common::send(
            &server,
            Request::builder()
                .uri("/")
                .header(header::HOST, "admin.local")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        ids.push(response.headers()["x-request-id"].to_str().unwrap().to_string());
    }
    assert_ne!(ids[0], ids[1]);
}
