// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, login and token refresh routes.
//!
//! Signup and login both answer with a token pair: a short-lived access
//! token for requests plus a long-lived refresh token. When the access
//! token expires, clients POST the refresh token to `/auth/issue` to get
//! a new one instead of re-authenticating.

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::bearer_token;
use crate::services::account;
use crate::services::token::TokenError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/issue", post(issue_token))
}

/// Credentials for signup and login.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub main_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub main_token: String,
}

/// Create an account and log straight in.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<TokenPairResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = account::create_account(&state.db, &req.email, &req.password).await?;
    token_pair(&state, user_id)
}

/// Exchange credentials for a token pair.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<TokenPairResponse>> {
    let user = account::verify_credentials(&state.db, &req.email, &req.password).await?;
    tracing::info!(user_id = user.id, "User logged in");
    token_pair(&state, user.id)
}

/// Mint a fresh access token from a long-lived refresh token.
///
/// This is the one place a token subject is re-checked against the user
/// table, so a deleted account stops refreshing even though request
/// auth is stateless.
async fn issue_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>> {
    let token = bearer_token(&headers)?;
    let claims = state.tokens.verify(token).map_err(|err| match err {
        TokenError::Expired => AppError::TokenExpired,
        _ => AppError::Unauthorized,
    })?;
    let user_id: i64 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(TokenResponse {
        main_token: state.tokens.issue(user_id, true)?,
    }))
}

fn token_pair(state: &AppState, user_id: i64) -> Result<Json<TokenPairResponse>> {
    Ok(Json(TokenPairResponse {
        main_token: state.tokens.issue(user_id, true)?,
        refresh_token: state.tokens.issue(user_id, false)?,
    }))
}
