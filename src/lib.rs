// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitlog: a personal health-tracking backend
//!
//! This crate provides the backend API for logging meals, workouts and
//! body measurements, with token-based authentication and incremental
//! sync for offline-capable clients.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::token::TokenService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Store,
    pub tokens: TokenService,
}
