// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Measurement records.

use serde::{Deserialize, Serialize};

/// A dated measurement: a weight entry, or a period-tracking toggle,
/// disambiguated by `is_period`. One row per (day, kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_period: bool,
    /// Day of the record (unix seconds)
    pub date: i64,
    /// Weight value, or 0/1 for a period toggle
    #[serde(default)]
    pub value: f64,
}
