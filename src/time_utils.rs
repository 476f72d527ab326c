// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time helpers.

use chrono::Utc;

/// Current wall-clock time as unix seconds.
///
/// Row `last_modified` stamps and token `iat`/`exp` claims all use this
/// single clock so incremental sync comparisons stay consistent.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
