// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schema bootstrap.
//!
//! All statements are `IF NOT EXISTS` so startup against an existing
//! database is a no-op.

use sqlx::SqlitePool;

/// Every entity row carries the owning `user_id`, a `last_modified`
/// unix-seconds stamp for incremental sync, and a soft-delete flag.
/// List- and map-valued fields (reps, serving sizes, meal tags, macro
/// targets) are stored as JSON text.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        email         TEXT    NOT NULL UNIQUE,
        password_hash TEXT    NOT NULL,
        created_at    INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
        user_id       INTEGER PRIMARY KEY,
        meal_tags     TEXT    NOT NULL,
        use_imperial  INTEGER NOT NULL,
        track_period  INTEGER NOT NULL,
        macro_targets TEXT    NOT NULL,
        dark_mode     INTEGER NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    );

    CREATE TABLE IF NOT EXISTS workouts (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL,
        name          TEXT    NOT NULL,
        notes         TEXT    NOT NULL DEFAULT '',
        date          INTEGER NOT NULL,
        is_template   INTEGER NOT NULL DEFAULT 0,
        last_modified INTEGER NOT NULL,
        deleted       INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id) REFERENCES users(id)
    );

    CREATE TABLE IF NOT EXISTS exercises (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL,
        workout_id    INTEGER NOT NULL,
        exercise_type TEXT    NOT NULL,
        name          TEXT    NOT NULL,
        weight        INTEGER NOT NULL DEFAULT 0,
        weight_unit   TEXT    NOT NULL DEFAULT '',
        reps          TEXT    NOT NULL DEFAULT '[]',
        duration      REAL    NOT NULL DEFAULT 0,
        last_modified INTEGER NOT NULL,
        deleted       INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id)    REFERENCES users(id),
        FOREIGN KEY (workout_id) REFERENCES workouts(id)
    );

    -- user_id is NULL for shared catalog entries
    CREATE TABLE IF NOT EXISTS foods (
        id                    INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id               INTEGER,
        name                  TEXT    NOT NULL,
        serving_sizes         TEXT    NOT NULL DEFAULT '[]',
        serving_units         TEXT    NOT NULL DEFAULT '[]',
        default_serving_index INTEGER NOT NULL DEFAULT 0,
        calories              REAL    NOT NULL DEFAULT 0,
        carbohydrate          REAL    NOT NULL DEFAULT 0,
        protein               REAL    NOT NULL DEFAULT 0,
        fat                   REAL    NOT NULL DEFAULT 0,
        calcium               REAL    NOT NULL DEFAULT 0,
        potassium             REAL    NOT NULL DEFAULT 0,
        iron                  REAL    NOT NULL DEFAULT 0,
        last_modified         INTEGER NOT NULL,
        deleted               INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS meals (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL,
        food_id       INTEGER NOT NULL,
        date          INTEGER NOT NULL,
        meal_tag      TEXT    NOT NULL,
        servings      REAL    NOT NULL,
        unit          TEXT    NOT NULL,
        last_modified INTEGER NOT NULL,
        deleted       INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id) REFERENCES users(id),
        FOREIGN KEY (food_id) REFERENCES foods(id)
    );

    -- is_period distinguishes period toggles from weight entries;
    -- one row per (user, day, kind)
    CREATE TABLE IF NOT EXISTS records (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL,
        date          INTEGER NOT NULL,
        value         REAL    NOT NULL DEFAULT 0,
        is_period     INTEGER NOT NULL DEFAULT 0,
        last_modified INTEGER NOT NULL,
        deleted       INTEGER NOT NULL DEFAULT 0,
        UNIQUE (user_id, date, is_period),
        FOREIGN KEY (user_id) REFERENCES users(id)
    );

    CREATE INDEX IF NOT EXISTS idx_workouts_user_modified  ON workouts(user_id, last_modified);
    CREATE INDEX IF NOT EXISTS idx_exercises_workout       ON exercises(workout_id);
    CREATE INDEX IF NOT EXISTS idx_meals_user_modified     ON meals(user_id, last_modified);
    CREATE INDEX IF NOT EXISTS idx_meals_user_date         ON meals(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_records_user_modified   ON records(user_id, last_modified);
    CREATE INDEX IF NOT EXISTS idx_foods_name              ON foods(name);
";

/// Create all tables and indexes for a new database.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
