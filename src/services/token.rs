// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token issuance and verification.
//!
//! Two kinds of token share one claim shape and differ only in lifetime:
//! short-lived access tokens that authenticate API requests, and
//! long-lived refresh tokens that mint new access tokens via
//! `/auth/issue`.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::time_utils::unix_now;

/// Issuer written into every token we mint; verification rejects
/// anything else.
pub const TOKEN_ISSUER: &str = "fitlog-token";

const ACCESS_TTL_SECS: i64 = 15 * 60;
const REFRESH_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Stringified user id
    pub sub: String,
    pub iss: String,
    /// Issued at (unix seconds)
    pub iat: usize,
    /// Expiry (unix seconds)
    pub exp: usize,
}

/// Token verification failures.
///
/// Callers only branch on `Expired` (to trigger the refresh flow); the
/// other variants all surface as a generic rejection.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unknown issuer")]
    WrongIssuer,

    #[error("Malformed token")]
    Malformed,
}

/// Signs and verifies bearer tokens with a symmetric key.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a token service from the configured signing secret.
    pub fn new(signing_key: &[u8]) -> Self {
        // Pinning the algorithm list to HS256 rejects algorithm
        // substitution ("none", RS256-with-our-key-as-public, ...).
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    /// Issue a token for a user: 15 minutes when `short_lived`, one year
    /// otherwise.
    pub fn issue(&self, user_id: i64, short_lived: bool) -> anyhow::Result<String> {
        let now = unix_now();
        let ttl = if short_lived {
            ACCESS_TTL_SECS
        } else {
            REFRESH_TTL_SECS
        };

        let claims = Claims {
            sub: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now as usize,
            exp: (now + ttl) as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                    TokenError::WrongIssuer
                }
                _ => TokenError::Malformed,
            })
    }
}
