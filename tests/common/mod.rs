// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitlog::config::Config;
use fitlog::db::Store;
use fitlog::routes::create_router;
use fitlog::services::TokenService;
use fitlog::AppState;
use std::sync::Arc;

/// Create an in-memory test store with the schema bootstrapped.
#[allow(dead_code)]
pub async fn test_store() -> Store {
    Store::connect_in_memory()
        .await
        .expect("in-memory database should open")
}

/// Create a test app over an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let tokens = TokenService::new(&config.jwt_signing_key);
    let db = test_store().await;

    let state = Arc::new(AppState { config, db, tokens });

    (create_router(state.clone()), state)
}

/// Insert a user directly (skipping the expensive password hash) and
/// issue an access token for it.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, email: &str) -> (i64, String) {
    let user_id = state
        .db
        .create_user_with_settings(email, "unused-hash")
        .await
        .expect("user insert should succeed");
    let token = state.tokens.issue(user_id, true).unwrap();
    (user_id, token)
}
