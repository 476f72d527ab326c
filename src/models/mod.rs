// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod meal;
pub mod record;
pub mod settings;
pub mod sync;
pub mod user;
pub mod workout;

pub use meal::{Food, Meal};
pub use record::Record;
pub use settings::Settings;
pub use sync::SyncSnapshot;
pub use user::User;
pub use workout::{Exercise, Workout};
