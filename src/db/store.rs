// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed storage operations over a SQLite pool.
//!
//! Every operation is scoped by the owning user id. Lookups return
//! `Option` so "not found" is distinguishable from a storage failure at
//! the type level. Multi-step operations (account creation, account
//! deletion, incremental sync) each run inside a single transaction:
//! they commit whole or roll back whole, and no partial state is
//! observable from outside.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{Exercise, Food, Meal, Record, Settings, SyncSnapshot, User, Workout};
use crate::time_utils::unix_now;

/// Database client.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `database_url` and
    /// bootstrap the schema.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            // The FOREIGN KEY clauses in the schema are documentation;
            // enforcement stays off so deleting an account can never be
            // blocked by another user's meal referencing a shared food.
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        crate::db::schema::init(&pool).await?;

        tracing::info!(url = database_url, "Connected to database");
        Ok(Self { pool })
    }

    /// In-memory database for tests.
    ///
    /// Each `:memory:` connection is a separate database, so the pool is
    /// capped at a single connection.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        crate::db::schema::init(&pool).await?;
        Ok(Self { pool })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id.
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a user row plus its default settings row in one
    /// transaction, so a user can never exist without settings.
    pub async fn create_user_with_settings(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(unix_now())
        .execute(&mut *tx)
        .await;

        // Backstop for the races the handler-level existence check
        // cannot catch.
        let user_id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict("account already exists".to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let defaults = Settings::default();
        sqlx::query(
            "INSERT INTO settings (user_id, meal_tags, use_imperial, track_period, macro_targets, dark_mode)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(encode_json(&defaults.meal_tags)?)
        .bind(defaults.use_imperial)
        .bind(defaults.track_period)
        .bind(encode_json(&defaults.macro_targets)?)
        .bind(defaults.dark_mode)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id, "Created account");
        Ok(user_id)
    }

    /// Hard-delete a user and every row the user owns, children before
    /// parents, in one transaction. Shared (unowned) food entries stay.
    pub async fn delete_user_data(&self, user_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM exercises WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM workouts WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM meals WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM foods WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM records WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM settings WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id, "Deleted account and all owned data");
        Ok(())
    }

    // ─── Incremental Sync ────────────────────────────────────────

    /// Collect everything the user changed after `since` as one
    /// consistent snapshot.
    ///
    /// A single transaction covers all reads: without it, writes landing
    /// between the workout fetch and the meal fetch would hand the
    /// client a snapshot spanning two instants. Soft-deleted rows are
    /// excluded unless `include_deleted`. Any failure rolls back and
    /// surfaces one error, never a partial snapshot.
    pub async fn pull_changes(
        &self,
        user_id: i64,
        since: i64,
        include_deleted: bool,
    ) -> Result<SyncSnapshot, AppError> {
        let mut tx = self.pool.begin().await?;

        // Workouts with their exercises nested. Exercises follow the
        // soft-delete visibility of the request but not the timestamp
        // filter: a changed workout always syncs whole.
        let workout_rows: Vec<WorkoutRow> = sqlx::query_as(
            "SELECT id, name, notes, date, is_template, deleted FROM workouts
             WHERE user_id = ? AND last_modified > ? AND (deleted = 0 OR ?)
             ORDER BY id",
        )
        .bind(user_id)
        .bind(since)
        .bind(include_deleted)
        .fetch_all(&mut *tx)
        .await?;

        let mut workouts = Vec::with_capacity(workout_rows.len());
        for row in workout_rows {
            let exercise_rows: Vec<ExerciseRow> = sqlx::query_as(
                "SELECT id, workout_id, exercise_type, name, weight, weight_unit, reps, duration
                 FROM exercises
                 WHERE user_id = ? AND workout_id = ? AND (deleted = 0 OR ?)
                 ORDER BY id",
            )
            .bind(user_id)
            .bind(row.id)
            .bind(include_deleted)
            .fetch_all(&mut *tx)
            .await?;

            let exercises = exercise_rows
                .into_iter()
                .map(ExerciseRow::into_exercise)
                .collect::<Result<Vec<_>, _>>()?;
            workouts.push(row.into_workout(exercises));
        }

        // Meals, with the referenced food fetched fresh by id into a
        // parallel list. Foods are not filtered by timestamp so the
        // client always sees current nutrition data.
        let meal_rows: Vec<MealRow> = sqlx::query_as(
            "SELECT id, date, food_id, meal_tag, servings, unit, deleted FROM meals
             WHERE user_id = ? AND last_modified > ? AND (deleted = 0 OR ?)
             ORDER BY id",
        )
        .bind(user_id)
        .bind(since)
        .bind(include_deleted)
        .fetch_all(&mut *tx)
        .await?;

        let mut meals = Vec::with_capacity(meal_rows.len());
        let mut foods = Vec::with_capacity(meal_rows.len());
        for row in meal_rows {
            let food_row: FoodRow = sqlx::query_as(
                "SELECT id, name, serving_sizes, serving_units, default_serving_index,
                        calories, carbohydrate, protein, fat, calcium, potassium, iron
                 FROM foods WHERE id = ?",
            )
            .bind(row.food_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::Database(format!(
                    "meal {} references missing food {}",
                    row.id, row.food_id
                ))
            })?;

            foods.push(food_row.into_food()?);
            meals.push(row.into_meal());
        }

        let record_rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT date, value, is_period, deleted FROM records
             WHERE user_id = ? AND last_modified > ? AND (deleted = 0 OR ?)
             ORDER BY date",
        )
        .bind(user_id)
        .bind(since)
        .bind(include_deleted)
        .fetch_all(&mut *tx)
        .await?;
        let records = record_rows.into_iter().map(RecordRow::into_record).collect();

        // Settings are a singleton, always returned in full. A missing
        // row means the user does not exist.
        let settings_row: SettingsRow = sqlx::query_as(
            "SELECT meal_tags, use_imperial, track_period, macro_targets, dark_mode
             FROM settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        let settings = settings_row.into_settings()?;

        tx.commit().await?;

        Ok(SyncSnapshot {
            workouts,
            meals,
            foods,
            records,
            settings,
        })
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Insert a workout and its exercises in one transaction, returning
    /// the workout with all ids assigned.
    pub async fn create_workout(
        &self,
        user_id: i64,
        mut workout: Workout,
    ) -> Result<Workout, AppError> {
        let now = unix_now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO workouts (user_id, name, notes, date, is_template, last_modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(user_id)
        .bind(&workout.name)
        .bind(&workout.notes)
        .bind(workout.date)
        .bind(workout.is_template)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let workout_id = result.last_insert_rowid();
        workout.id = workout_id;
        workout.deleted = false;

        for exercise in &mut workout.exercises {
            exercise.workout_id = workout_id;
            let result = sqlx::query(
                "INSERT INTO exercises
                     (user_id, workout_id, exercise_type, name, weight, weight_unit,
                      reps, duration, last_modified, deleted)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
            )
            .bind(user_id)
            .bind(workout_id)
            .bind(&exercise.exercise_type)
            .bind(&exercise.name)
            .bind(exercise.weight)
            .bind(&exercise.weight_unit)
            .bind(encode_json(&exercise.reps)?)
            .bind(exercise.duration)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            exercise.id = result.last_insert_rowid();
        }

        tx.commit().await?;
        Ok(workout)
    }

    /// Soft-delete a workout and its exercises, bumping `last_modified`
    /// so the deletion syncs.
    pub async fn delete_workout(&self, user_id: i64, workout_id: i64) -> Result<(), AppError> {
        let now = unix_now();
        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE workouts SET deleted = 1, last_modified = ? WHERE user_id = ? AND id = ?")
                .bind(now)
                .bind(user_id)
                .bind(workout_id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("workout {} not found", workout_id)));
        }

        sqlx::query(
            "UPDATE exercises SET deleted = 1, last_modified = ? WHERE user_id = ? AND workout_id = ?",
        )
        .bind(now)
        .bind(user_id)
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // ─── Food Operations ─────────────────────────────────────────

    /// Create a food entry owned by `user_id`.
    pub async fn create_food(&self, user_id: i64, food: &Food) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO foods
                 (user_id, name, serving_sizes, serving_units, default_serving_index,
                  calories, carbohydrate, protein, fat, calcium, potassium, iron,
                  last_modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(user_id)
        .bind(&food.name)
        .bind(encode_json(&food.serving_sizes)?)
        .bind(encode_json(&food.serving_units)?)
        .bind(food.default_serving_index)
        .bind(food.calories)
        .bind(food.carbohydrate)
        .bind(food.protein)
        .bind(food.fat)
        .bind(food.calcium)
        .bind(food.potassium)
        .bind(food.iron)
        .bind(unix_now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a food by id. Foods are a shared pool, so this is not scoped
    /// by user.
    pub async fn get_food(&self, food_id: i64) -> Result<Option<Food>, AppError> {
        let row: Option<FoodRow> = sqlx::query_as(
            "SELECT id, name, serving_sizes, serving_units, default_serving_index,
                    calories, carbohydrate, protein, fat, calcium, potassium, iron
             FROM foods WHERE id = ?",
        )
        .bind(food_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FoodRow::into_food).transpose()
    }

    /// Search foods by name. The pool is shared by default; passing
    /// `only_user` restricts results to entries that user created.
    pub async fn search_foods(
        &self,
        query: &str,
        only_user: Option<i64>,
    ) -> Result<Vec<Food>, AppError> {
        let rows: Vec<FoodRow> = sqlx::query_as(
            "SELECT id, name, serving_sizes, serving_units, default_serving_index,
                    calories, carbohydrate, protein, fat, calcium, potassium, iron
             FROM foods
             WHERE deleted = 0 AND name LIKE '%' || ? || '%' AND (? IS NULL OR user_id = ?)
             ORDER BY name
             LIMIT 50",
        )
        .bind(query)
        .bind(only_user)
        .bind(only_user)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FoodRow::into_food).collect()
    }

    // ─── Meal Operations ─────────────────────────────────────────

    /// Log a meal, returning its id.
    pub async fn create_meal(&self, user_id: i64, meal: &Meal) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO meals (user_id, food_id, date, meal_tag, servings, unit, last_modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(user_id)
        .bind(meal.food_id)
        .bind(meal.date)
        .bind(&meal.meal_tag)
        .bind(meal.servings)
        .bind(&meal.unit)
        .bind(unix_now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Update the editable fields of a logged meal.
    pub async fn update_meal(&self, user_id: i64, meal: &Meal) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE meals SET meal_tag = ?, servings = ?, unit = ?, last_modified = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(&meal.meal_tag)
        .bind(meal.servings)
        .bind(&meal.unit)
        .bind(unix_now())
        .bind(user_id)
        .bind(meal.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("meal {} not found", meal.id)));
        }
        Ok(())
    }

    /// Soft-delete a meal.
    pub async fn delete_meal(&self, user_id: i64, meal_id: i64) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE meals SET deleted = 1, last_modified = ? WHERE user_id = ? AND id = ?")
                .bind(unix_now())
                .bind(user_id)
                .bind(meal_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("meal {} not found", meal_id)));
        }
        Ok(())
    }

    /// All visible meals logged on a given day.
    pub async fn meals_for_day(&self, user_id: i64, date: i64) -> Result<Vec<Meal>, AppError> {
        let rows: Vec<MealRow> = sqlx::query_as(
            "SELECT id, date, food_id, meal_tag, servings, unit, deleted FROM meals
             WHERE user_id = ? AND date = ? AND deleted = 0
             ORDER BY id",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MealRow::into_meal).collect())
    }

    // ─── Record Operations ───────────────────────────────────────

    /// Upsert a measurement for a day: weight when `is_period` is false,
    /// a period toggle otherwise. Re-setting a soft-deleted day revives
    /// it.
    pub async fn upsert_record(
        &self,
        user_id: i64,
        date: i64,
        value: f64,
        is_period: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO records (user_id, date, value, is_period, last_modified, deleted)
             VALUES (?, ?, ?, ?, ?, 0)
             ON CONFLICT (user_id, date, is_period)
             DO UPDATE SET value = excluded.value, last_modified = excluded.last_modified, deleted = 0",
        )
        .bind(user_id)
        .bind(date)
        .bind(value)
        .bind(is_period)
        .bind(unix_now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Soft-delete the weight entry for a day.
    pub async fn delete_weight_record(&self, user_id: i64, date: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE records SET deleted = 1, last_modified = ?
             WHERE user_id = ? AND date = ? AND is_period = 0",
        )
        .bind(unix_now())
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("no weight entry for day {}", date)));
        }
        Ok(())
    }

    // ─── Settings Operations ─────────────────────────────────────

    /// Get a user's settings.
    pub async fn get_settings(&self, user_id: i64) -> Result<Option<Settings>, AppError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT meal_tags, use_imperial, track_period, macro_targets, dark_mode
             FROM settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SettingsRow::into_settings).transpose()
    }

    /// Replace a user's settings wholesale.
    pub async fn put_settings(&self, user_id: i64, settings: &Settings) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE settings SET meal_tags = ?, use_imperial = ?, track_period = ?,
                                 macro_targets = ?, dark_mode = ?
             WHERE user_id = ?",
        )
        .bind(encode_json(&settings.meal_tags)?)
        .bind(settings.use_imperial)
        .bind(settings.track_period)
        .bind(encode_json(&settings.macro_targets)?)
        .bind(settings.dark_mode)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        Ok(())
    }
}

// ─── Row Types ───────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: i64,
    name: String,
    notes: String,
    date: i64,
    is_template: bool,
    deleted: bool,
}

impl WorkoutRow {
    fn into_workout(self, exercises: Vec<Exercise>) -> Workout {
        Workout {
            deleted: self.deleted,
            id: self.id,
            name: self.name,
            notes: self.notes,
            date: self.date,
            is_template: self.is_template,
            exercises,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    id: i64,
    workout_id: i64,
    exercise_type: String,
    name: String,
    weight: i64,
    weight_unit: String,
    reps: String,
    duration: f64,
}

impl ExerciseRow {
    fn into_exercise(self) -> Result<Exercise, AppError> {
        Ok(Exercise {
            id: self.id,
            workout_id: self.workout_id,
            exercise_type: self.exercise_type,
            name: self.name,
            weight: self.weight,
            weight_unit: self.weight_unit,
            reps: decode_json(&self.reps)?,
            duration: self.duration,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FoodRow {
    id: i64,
    name: String,
    serving_sizes: String,
    serving_units: String,
    default_serving_index: i64,
    calories: f64,
    carbohydrate: f64,
    protein: f64,
    fat: f64,
    calcium: f64,
    potassium: f64,
    iron: f64,
}

impl FoodRow {
    fn into_food(self) -> Result<Food, AppError> {
        Ok(Food {
            id: self.id,
            name: self.name,
            serving_sizes: decode_json(&self.serving_sizes)?,
            serving_units: decode_json(&self.serving_units)?,
            default_serving_index: self.default_serving_index,
            calories: self.calories,
            carbohydrate: self.carbohydrate,
            protein: self.protein,
            fat: self.fat,
            calcium: self.calcium,
            potassium: self.potassium,
            iron: self.iron,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MealRow {
    id: i64,
    date: i64,
    food_id: i64,
    meal_tag: String,
    servings: f64,
    unit: String,
    deleted: bool,
}

impl MealRow {
    fn into_meal(self) -> Meal {
        Meal {
            deleted: self.deleted,
            id: self.id,
            date: self.date,
            food_id: self.food_id,
            meal_tag: self.meal_tag,
            servings: self.servings,
            unit: self.unit,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    date: i64,
    value: f64,
    is_period: bool,
    deleted: bool,
}

impl RecordRow {
    fn into_record(self) -> Record {
        Record {
            deleted: self.deleted,
            is_period: self.is_period,
            date: self.date,
            value: self.value,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    meal_tags: String,
    use_imperial: bool,
    track_period: bool,
    macro_targets: String,
    dark_mode: bool,
}

impl SettingsRow {
    fn into_settings(self) -> Result<Settings, AppError> {
        Ok(Settings {
            meal_tags: decode_json(&self.meal_tags)?,
            use_imperial: self.use_imperial,
            track_period: self.track_period,
            macro_targets: decode_json(&self.macro_targets)?,
            dark_mode: self.dark_mode,
        })
    }
}

// ─── JSON Column Helpers ─────────────────────────────────────────

fn encode_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Database(format!("JSON encode: {}", e)))
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::Database(format!("corrupt JSON column: {}", e)))
}
