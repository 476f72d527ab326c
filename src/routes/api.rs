// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Food, Meal, Settings, SyncSnapshot, Workout};
use crate::services::account;
use crate::AppState;

/// API routes (require authentication via bearer token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sync", get(sync))
        .route("/api/account", delete(delete_account))
        .route("/api/workouts", post(create_workout).delete(delete_workout))
        .route("/api/foods", post(create_food).get(get_food))
        .route("/api/foods/search", get(search_foods))
        .route("/api/meals", post(set_meal).get(get_meals).delete(delete_meal))
        .route("/api/records/weight", put(set_weight).delete(delete_weight))
        .route("/api/records/period", post(toggle_period))
        .route("/api/settings", put(update_settings))
}

#[derive(Deserialize)]
struct IdQuery {
    id: i64,
}

#[derive(Deserialize)]
struct DayQuery {
    date: i64,
}

// ─── Incremental Sync ────────────────────────────────────────

#[derive(Deserialize)]
struct SyncQuery {
    /// Last sync time (unix seconds); only rows modified after this are
    /// returned
    since: i64,
    #[serde(rename = "includeDeleted", default)]
    include_deleted: bool,
}

/// Pull everything that changed since the client's last sync.
async fn sync(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SyncQuery>,
) -> Result<Json<SyncSnapshot>> {
    let snapshot = state
        .db
        .pull_changes(user.user_id, params.since, params.include_deleted)
        .await?;
    Ok(Json(snapshot))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Deserialize)]
struct DeleteAccountRequest {
    password: String,
}

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Delete the account and all its data, gated on password re-entry.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<DeleteAccountRequest>,
) -> Result<Json<DeleteAccountResponse>> {
    account::delete_account(&state.db, user.user_id, &req.password).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account and all data removed".to_string(),
    }))
}

// ─── Workouts ────────────────────────────────────────────────

/// Log a workout with its exercises; responds with the ids assigned.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(workout): Json<Workout>,
) -> Result<Json<Workout>> {
    let workout = state.db.create_workout(user.user_id, workout).await?;
    Ok(Json(workout))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<IdQuery>,
) -> Result<StatusCode> {
    state.db.delete_workout(user.user_id, params.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Foods ───────────────────────────────────────────────────

#[derive(Serialize)]
struct CreateFoodResponse {
    id: i64,
}

async fn create_food(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(food): Json<Food>,
) -> Result<Json<CreateFoodResponse>> {
    let id = state.db.create_food(user.user_id, &food).await?;
    Ok(Json(CreateFoodResponse { id }))
}

async fn get_food(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdQuery>,
) -> Result<Json<Food>> {
    let food = state
        .db
        .get_food(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("food {} not found", params.id)))?;
    Ok(Json(food))
}

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
    /// When set, only return foods this user created; the catalog is
    /// shared otherwise
    #[serde(rename = "onlyUser", default)]
    only_user: bool,
}

#[derive(Serialize)]
struct SearchFoodsResponse {
    results: Vec<Food>,
}

async fn search_foods(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchFoodsResponse>> {
    let only_user = params.only_user.then_some(user.user_id);
    let results = state.db.search_foods(&params.query, only_user).await?;
    Ok(Json(SearchFoodsResponse { results }))
}

// ─── Meals ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealUpsertRequest {
    /// Update an existing meal in place instead of logging a new one
    #[serde(default)]
    updating: bool,
    #[serde(default)]
    id: i64,
    #[serde(default)]
    date: i64,
    #[serde(rename = "foodID", default)]
    food_id: i64,
    meal_tag: String,
    servings: f64,
    #[serde(rename = "servingsUnit")]
    unit: String,
}

#[derive(Serialize)]
struct SetMealResponse {
    #[serde(rename = "mealID")]
    meal_id: i64,
}

async fn set_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<MealUpsertRequest>,
) -> Result<Json<SetMealResponse>> {
    let meal = Meal {
        deleted: false,
        id: req.id,
        date: req.date,
        food_id: req.food_id,
        meal_tag: req.meal_tag,
        servings: req.servings,
        unit: req.unit,
    };

    let meal_id = if req.updating {
        state.db.update_meal(user.user_id, &meal).await?;
        meal.id
    } else {
        state.db.create_meal(user.user_id, &meal).await?
    };

    Ok(Json(SetMealResponse { meal_id }))
}

#[derive(Serialize)]
struct MealsResponse {
    meals: Vec<Meal>,
}

/// All meals logged on one day.
async fn get_meals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DayQuery>,
) -> Result<Json<MealsResponse>> {
    let meals = state.db.meals_for_day(user.user_id, params.date).await?;
    Ok(Json(MealsResponse { meals }))
}

async fn delete_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<IdQuery>,
) -> Result<StatusCode> {
    state.db.delete_meal(user.user_id, params.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Records ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct WeightQuery {
    date: i64,
    value: f64,
}

async fn set_weight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<WeightQuery>,
) -> Result<StatusCode> {
    state
        .db
        .upsert_record(user.user_id, params.date, params.value, false)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_weight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DayQuery>,
) -> Result<StatusCode> {
    state
        .db
        .delete_weight_record(user.user_id, params.date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct PeriodQuery {
    date: i64,
    /// 1 marks the day, 0 clears it
    set: i64,
}

async fn toggle_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PeriodQuery>,
) -> Result<StatusCode> {
    let value = if params.set != 0 { 1.0 } else { 0.0 };
    state
        .db
        .upsert_record(user.user_id, params.date, value, true)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Settings ────────────────────────────────────────────────

/// Replace the caller's settings wholesale.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(settings): Json<Settings>,
) -> Result<StatusCode> {
    state.db.put_settings(user.user_id, &settings).await?;
    Ok(StatusCode::NO_CONTENT)
}
