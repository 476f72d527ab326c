// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account lifecycle: creation, credential checks, deletion.
//!
//! The only lifecycle transitions are nonexistent -> active (create) and
//! active -> deleted (delete, terminal). The Argon2 work happens on the
//! blocking thread pool so concurrent signups cannot starve the async
//! executor.

use anyhow::anyhow;
use tokio::task;

use crate::db::Store;
use crate::error::AppError;
use crate::models::User;
use crate::services::password;

/// Create an account with default settings, returning the new user id.
///
/// The user row and its settings row are inserted in one transaction,
/// so a user never exists without settings. A duplicate email is a
/// conflict.
pub async fn create_account(store: &Store, email: &str, password: &str) -> Result<i64, AppError> {
    if store.get_user_by_email(email).await?.is_some() {
        return Err(AppError::Conflict("account already exists".to_string()));
    }

    let password = password.to_string();
    let hash = task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow!("hashing task failed: {}", e)))??;

    store.create_user_with_settings(email, &hash).await
}

/// Check an email/password pair, returning the user on success.
///
/// Unknown email and wrong password are the same `Unauthorized`; the
/// response never reveals which check failed.
pub async fn verify_credentials(
    store: &Store,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = store
        .get_user_by_email(email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let correct = task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow!("verification task failed: {}", e)))??;

    if !correct {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(AppError::Unauthorized);
    }
    Ok(user)
}

/// Delete an account and everything it owns.
///
/// The password is re-verified against the stored hash first, so a
/// stolen token alone is not enough to destroy data. The deletion
/// itself is one transaction; it commits whole or not at all.
pub async fn delete_account(store: &Store, user_id: i64, password: &str) -> Result<(), AppError> {
    let user = store.get_user(user_id).await?.ok_or(AppError::Unauthorized)?;

    let password = password.to_string();
    let correct =
        task::spawn_blocking(move || password::verify_password(&password, &user.password_hash))
            .await
            .map_err(|e| AppError::Internal(anyhow!("verification task failed: {}", e)))??;

    if !correct {
        tracing::warn!(user_id, "Account deletion with wrong password");
        return Err(AppError::Unauthorized);
    }

    store.delete_user_data(user_id).await
}
