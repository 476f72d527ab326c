// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with Argon2id.
//!
//! Hashes are stored as self-describing PHC-style strings:
//!
//! `$argon2id$v=19$m=<KiB>,t=<time>,p=<lanes>$<b64 salt>$<b64 key>`
//!
//! Verification re-derives the key from the *parsed* parameters rather
//! than the current constants, so hashes written with older cost settings
//! keep verifying after the defaults change.
//!
//! The KDF is deliberately memory- and CPU-expensive; call sites run it
//! on the blocking thread pool (`tokio::task::spawn_blocking`) so it
//! cannot stall the async executor.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 32;
const KEY_LEN: usize = 64;

// Cost parameters written into new hashes.
const VERSION: u32 = 19; // Version::V0x13
const MEMORY_COST_KIB: u32 = 64 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 4;

/// Errors from hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Unsupported hash algorithm")]
    UnsupportedAlgorithm,

    #[error("Malformed password hash")]
    Malformed,

    #[error("Key derivation failed: {0}")]
    Derivation(String),
}

impl From<PasswordError> for crate::error::AppError {
    /// Hash problems are internal: the stored hash is ours, so a parse
    /// failure means corrupt data, not caller error.
    fn from(err: PasswordError) -> Self {
        crate::error::AppError::Internal(anyhow::Error::new(err))
    }
}

/// Hash a password with a fresh random salt.
///
/// Two calls with the same password produce different strings; both
/// verify against it.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(
        password.as_bytes(),
        &salt,
        MEMORY_COST_KIB,
        TIME_COST,
        PARALLELISM,
        KEY_LEN,
    )?;

    Ok(format!(
        "$argon2id$v={}$m={},t={},p={}${}${}",
        VERSION,
        MEMORY_COST_KIB,
        TIME_COST,
        PARALLELISM,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(key)
    ))
}

/// Check a password against a stored hash.
///
/// Returns `Ok(false)` for a wrong password; a hash that cannot be
/// parsed is an error, never a silent mismatch. The comparison covers
/// the full derived key regardless of where the first mismatch is.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let parsed = parse_hash(encoded)?;

    let derived = derive_key(
        password.as_bytes(),
        &parsed.salt,
        parsed.memory_kib,
        parsed.time_cost,
        parsed.parallelism,
        parsed.key.len(),
    )?;

    Ok(bool::from(derived.ct_eq(&parsed.key)))
}

struct ParsedHash {
    memory_kib: u32,
    time_cost: u32,
    parallelism: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

fn parse_hash(encoded: &str) -> Result<ParsedHash, PasswordError> {
    let parts: Vec<&str> = encoded.split('$').collect();
    // Leading '$' yields an empty first field.
    if parts.len() != 6 || !parts[0].is_empty() {
        return Err(PasswordError::Malformed);
    }
    if parts[1] != "argon2id" {
        return Err(PasswordError::UnsupportedAlgorithm);
    }

    let version: u32 = parts[2]
        .strip_prefix("v=")
        .ok_or(PasswordError::Malformed)?
        .parse()
        .map_err(|_| PasswordError::Malformed)?;
    if version != VERSION {
        return Err(PasswordError::UnsupportedAlgorithm);
    }

    let (mut memory, mut time, mut parallelism) = (None, None, None);
    for param in parts[3].split(',') {
        let (name, value) = param.split_once('=').ok_or(PasswordError::Malformed)?;
        let value: u32 = value.parse().map_err(|_| PasswordError::Malformed)?;
        match name {
            "m" => memory = Some(value),
            "t" => time = Some(value),
            "p" => parallelism = Some(value),
            _ => return Err(PasswordError::Malformed),
        }
    }

    let salt = STANDARD_NO_PAD
        .decode(parts[4])
        .map_err(|_| PasswordError::Malformed)?;
    let key = STANDARD_NO_PAD
        .decode(parts[5])
        .map_err(|_| PasswordError::Malformed)?;

    Ok(ParsedHash {
        memory_kib: memory.ok_or(PasswordError::Malformed)?,
        time_cost: time.ok_or(PasswordError::Malformed)?,
        parallelism: parallelism.ok_or(PasswordError::Malformed)?,
        salt,
        key,
    })
}

fn derive_key(
    password: &[u8],
    salt: &[u8],
    memory_kib: u32,
    time_cost: u32,
    parallelism: u32,
    key_len: usize,
) -> Result<Vec<u8>, PasswordError> {
    let params = Params::new(memory_kib, time_cost, parallelism, Some(key_len))
        .map_err(|e| PasswordError::Derivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = vec![0u8; key_len];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| PasswordError::Derivation(e.to_string()))?;
    Ok(key)
}
