// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-user settings singleton.
///
/// Created with defaults when the account is created, and replaced
/// wholesale by the owner afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Ordered meal tag labels shown when logging a meal
    pub meal_tags: Vec<String>,
    pub use_imperial: bool,
    pub track_period: bool,
    /// Nutrient name -> daily target
    pub macro_targets: HashMap<String, i64>,
    pub dark_mode: bool,
}

impl Default for Settings {
    /// Defaults applied at account creation.
    fn default() -> Self {
        Self {
            meal_tags: vec![
                "Breakfast".to_string(),
                "Lunch".to_string(),
                "Dinner".to_string(),
            ],
            use_imperial: true,
            track_period: true,
            macro_targets: HashMap::from([("calories".to_string(), 2000)]),
            dark_mode: false,
        }
    }
}
