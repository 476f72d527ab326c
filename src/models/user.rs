// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account model.

/// A registered account.
///
/// The password hash is a self-describing PHC-style string (see
/// `services::password`); it never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    /// When the account was created (unix seconds)
    pub created_at: i64,
}
