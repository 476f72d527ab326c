// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal and food models.

use serde::{Deserialize, Serialize};

/// A food catalog entry.
///
/// Foods are shared across users by default; an entry created through the
/// API is additionally tagged with its creator so searches can be scoped
/// with `onlyUser`. Ownership is storage-level state and not part of the
/// wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Serving sizes, index-aligned with `serving_units`
    #[serde(default)]
    pub serving_sizes: Vec<f64>,
    #[serde(default)]
    pub serving_units: Vec<String>,
    #[serde(default)]
    pub default_serving_index: i64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub calcium: f64,
    #[serde(default)]
    pub potassium: f64,
    #[serde(default)]
    pub iron: f64,
}

/// A logged meal referencing a food entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub id: i64,
    /// Day of the meal (unix seconds)
    pub date: i64,
    #[serde(rename = "foodID")]
    pub food_id: i64,
    pub meal_tag: String,
    pub servings: f64,
    #[serde(rename = "servingsUnit")]
    pub unit: String,
}
