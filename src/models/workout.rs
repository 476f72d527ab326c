// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout and exercise models.

use serde::{Deserialize, Serialize};

/// A logged workout (or a reusable template) with its exercises nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// Day of the workout (unix seconds)
    pub date: i64,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// One exercise within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "workoutID", default)]
    pub workout_id: i64,
    /// "strength" or "cardio"
    pub exercise_type: String,
    pub name: String,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub weight_unit: String,
    /// Reps per set
    #[serde(default)]
    pub reps: Vec<i64>,
    /// Cardio duration in minutes
    #[serde(default)]
    pub duration: f64,
}
