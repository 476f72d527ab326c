// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::error::AppError;
use crate::services::token::TokenError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is case-sensitive with a single space separator;
/// surrounding whitespace is trimmed. Anything else is a generic
/// unauthorized; the response never says which part was wrong.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    header
        .trim()
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)
}

/// Middleware that requires a valid access token.
///
/// The subject is trusted without a user lookup: tokens are signed by us
/// and access tokens expire after 15 minutes, so the signature plus the
/// short window is the trust boundary. `/auth/issue` re-checks the user
/// row before minting a new access token, which bounds how long a
/// deleted account keeps access.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims = state.tokens.verify(token).map_err(|err| match err {
        TokenError::Expired => AppError::TokenExpired,
        _ => AppError::Unauthorized,
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
