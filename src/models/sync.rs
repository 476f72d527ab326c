// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incremental sync snapshot.

use serde::{Deserialize, Serialize};

use crate::models::{Food, Meal, Record, Settings, Workout};

/// Everything a client needs to catch up after `since`.
///
/// `foods` is index-aligned with `meals`: `foods[i]` is the (always
/// current) food referenced by `meals[i]`, so clients get fresh nutrition
/// data without a second round trip. Settings are a singleton and always
/// returned in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub workouts: Vec<Workout>,
    pub meals: Vec<Meal>,
    pub foods: Vec<Food>,
    pub records: Vec<Record>,
    pub settings: Settings,
}
