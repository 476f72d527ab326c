// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These drive the full router: protected routes must reject missing,
//! invalid and expired tokens (distinguishably, for the last one), and
//! the signup → login → authenticated-request flow must work end to end.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fitlog::services::token::{Claims, TOKEN_ISSUER};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

mod common;

/// Signing key from `Config::test_default`.
const TEST_KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an already-expired access token signed with the test key.
fn expired_token(user_id: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now - 3600,
        exp: now - 1800,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_KEY),
    )
    .unwrap()
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/sync?since=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(authed_request("GET", "/api/sync?since=0", "invalid.token.here"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_expired_token() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(authed_request("GET", "/api/sync?since=0", &expired_token(1)))
        .await
        .unwrap();

    // Still a 401, but distinguishable so the client can refresh
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "token_expired");
}

#[tokio::test]
async fn test_lowercase_bearer_scheme_rejected() {
    let (app, state) = common::create_test_app().await;
    let (_user_id, token) = common::seed_user(&state, "a@x.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/sync?since=0")
                .header(header::AUTHORIZATION, format!("bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, state) = common::create_test_app().await;
    let (_user_id, token) = common::seed_user(&state, "a@x.com").await;

    let response = app
        .oneshot(authed_request("GET", "/api/sync?since=0", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/sync")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_signup_login_sync_flow() {
    let (app, _state) = common::create_test_app().await;

    // Sign up
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({"email": "a@x.com", "password": "secret123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let main_token = tokens["mainToken"].as_str().unwrap().to_string();
    assert!(tokens["refreshToken"].as_str().is_some());

    // The fresh access token works, and the account got its defaults
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/sync?since=0", &main_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;
    assert_eq!(
        snapshot["settings"]["mealTags"],
        json!(["Breakfast", "Lunch", "Dinner"])
    );

    // Wrong password
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"email": "a@x.com", "password": "wrongpass"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Right password
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"email": "a@x.com", "password": "secret123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    assert!(tokens["mainToken"].as_str().is_some());
}

#[tokio::test]
async fn test_signup_rejects_invalid_email() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({"email": "not-an-email", "password": "secret123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let (app, _state) = common::create_test_app().await;

    let signup = || {
        json_request(
            "POST",
            "/auth/signup",
            json!({"email": "a@x.com", "password": "secret123"}),
        )
    };

    let response = app.clone().oneshot(signup()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(signup()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refresh_and_account_deletion_flow() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({"email": "a@x.com", "password": "secret123"}),
        ))
        .await
        .unwrap();
    let tokens = body_json(response).await;
    let refresh_token = tokens["refreshToken"].as_str().unwrap().to_string();

    // The refresh token mints a fresh access token
    let response = app
        .clone()
        .oneshot(authed_request("POST", "/auth/issue", &refresh_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let minted = body_json(response).await;
    let main_token = minted["mainToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/sync?since=0", &main_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete the account (password re-entry required)
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/account")
                .header(header::AUTHORIZATION, format!("Bearer {}", main_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"password": "secret123"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // /auth/issue re-checks the user row, so the refresh token is dead
    let response = app
        .clone()
        .oneshot(authed_request("POST", "/auth/issue", &refresh_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The not-yet-expired access token still authenticates (trust is
    // stateless by design), but the data is gone
    let response = app
        .oneshot(authed_request("GET", "/api/sync?since=0", &main_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
