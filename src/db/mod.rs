// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Database layer (SQLite via sqlx).

pub mod schema;
pub mod store;

pub use store::Store;
