// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CRUD handler tests for workouts, foods, meals, records and settings.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

fn authed_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_workout_create_and_delete() {
    let (app, state) = common::create_test_app().await;
    let (_user, token) = common::seed_user(&state, "a@x.com").await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/workouts",
            &token,
            json!({
                "name": "Push day",
                "notes": "felt strong",
                "date": 1_700_000_000i64,
                "isTemplate": false,
                "exercises": [{
                    "exerciseType": "strength",
                    "name": "Bench press",
                    "weight": 135,
                    "weightUnit": "lbs",
                    "reps": [8, 8, 6],
                    "duration": 0.0
                }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let workout = body_json(response).await;
    let workout_id = workout["id"].as_i64().unwrap();
    assert!(workout_id > 0);
    assert!(workout["exercises"][0]["id"].as_i64().unwrap() > 0);
    assert_eq!(workout["exercises"][0]["workoutID"].as_i64().unwrap(), workout_id);

    // Soft delete; the deletion must show up in a deleted-inclusive sync
    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/workouts?id={}", workout_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/sync?since=0", &token))
        .await
        .unwrap();
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["workouts"].as_array().unwrap().len(), 0);

    let response = app
        .oneshot(authed("GET", "/api/sync?since=0&includeDeleted=true", &token))
        .await
        .unwrap();
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["workouts"][0]["deleted"], json!(true));
}

#[tokio::test]
async fn test_food_create_get_and_search_scoping() {
    let (app, state) = common::create_test_app().await;
    let (_alice, alice_token) = common::seed_user(&state, "alice@x.com").await;
    let (_bob, bob_token) = common::seed_user(&state, "bob@x.com").await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/foods",
            &alice_token,
            json!({
                "name": "Overnight oats",
                "servingSizes": [100.0],
                "servingUnits": ["g"],
                "defaultServingIndex": 0,
                "calories": 389.0,
                "carbohydrate": 66.3,
                "protein": 16.9,
                "fat": 6.9,
                "calcium": 0.054,
                "potassium": 0.429,
                "iron": 0.005
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let food_id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/foods?id={}", food_id), &bob_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let food = body_json(response).await;
    assert_eq!(food["name"], "Overnight oats");

    // The catalog is shared: bob finds alice's food by default...
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/foods/search?query=oats", &bob_token))
        .await
        .unwrap();
    let results = body_json(response).await;
    assert_eq!(results["results"].as_array().unwrap().len(), 1);

    // ...but not when scoping to his own entries
    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            "/api/foods/search?query=oats&onlyUser=true",
            &bob_token,
        ))
        .await
        .unwrap();
    let results = body_json(response).await;
    assert_eq!(results["results"].as_array().unwrap().len(), 0);

    let response = app
        .oneshot(authed("GET", "/api/foods?id=99999", &alice_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meal_log_update_and_delete() {
    let (app, state) = common::create_test_app().await;
    let (user, token) = common::seed_user(&state, "a@x.com").await;
    let day = 1_700_000_000i64;

    let food_id = state
        .db
        .create_food(
            user,
            &fitlog::models::Food {
                id: 0,
                name: "Rice".to_string(),
                serving_sizes: vec![100.0],
                serving_units: vec!["g".to_string()],
                default_serving_index: 0,
                calories: 130.0,
                carbohydrate: 28.0,
                protein: 2.7,
                fat: 0.3,
                calcium: 0.0,
                potassium: 0.0,
                iron: 0.0,
            },
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/meals",
            &token,
            json!({
                "date": day,
                "foodID": food_id,
                "mealTag": "Lunch",
                "servings": 1.5,
                "servingsUnit": "g"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let meal_id = body_json(response).await["mealID"].as_i64().unwrap();

    // Update in place
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/meals",
            &token,
            json!({
                "updating": true,
                "id": meal_id,
                "mealTag": "Dinner",
                "servings": 2.0,
                "servingsUnit": "g"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/meals?date={}", day), &token))
        .await
        .unwrap();
    let meals = body_json(response).await;
    assert_eq!(meals["meals"].as_array().unwrap().len(), 1);
    assert_eq!(meals["meals"][0]["mealTag"], "Dinner");
    assert_eq!(meals["meals"][0]["servings"], 2.0);

    let response = app
        .clone()
        .oneshot(authed("DELETE", &format!("/api/meals?id={}", meal_id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(authed("GET", &format!("/api/meals?date={}", day), &token))
        .await
        .unwrap();
    let meals = body_json(response).await;
    assert_eq!(meals["meals"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_records_weight_and_period() {
    let (app, state) = common::create_test_app().await;
    let (_user, token) = common::seed_user(&state, "a@x.com").await;
    let day = 1_700_000_000i64;

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/records/weight?date={}&value=180.5", day),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/records/period?date={}&set=1", day),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/sync?since=0", &token))
        .await
        .unwrap();
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["records"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/records/weight?date={}", day),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(authed("GET", "/api/sync?since=0", &token))
        .await
        .unwrap();
    let snapshot = body_json(response).await;
    let records = snapshot["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["isPeriod"], json!(true));
}

#[tokio::test]
async fn test_settings_update_roundtrip() {
    let (app, state) = common::create_test_app().await;
    let (_user, token) = common::seed_user(&state, "a@x.com").await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            "/api/settings",
            &token,
            json!({
                "mealTags": ["Morning", "Evening"],
                "useImperial": false,
                "trackPeriod": false,
                "macroTargets": {"protein": 140},
                "darkMode": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(authed("GET", "/api/sync?since=0", &token))
        .await
        .unwrap();
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["settings"]["mealTags"], json!(["Morning", "Evening"]));
    assert_eq!(snapshot["settings"]["useImperial"], json!(false));
    assert_eq!(snapshot["settings"]["darkMode"], json!(true));
    assert_eq!(snapshot["settings"]["macroTargets"]["protein"], json!(140));
}
