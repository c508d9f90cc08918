use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    models::{DatabaseOverview, MealRecord, MealRecordUpdate, MenuPeriod, NewMealRecord},
    state::AppState,
};

type SharedState = State<Arc<AppState>>;

#[derive(Deserialize)]
pub struct PeriodQuery {
    month: Option<String>,
    year: Option<i32>,
}

#[derive(Serialize)]
pub struct SeedResponse {
    message: &'static str,
    inserted: usize,
    updated: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    message: &'static str,
    server: &'static str,
    database: &'static str,
    storage: &'static str,
    timestamp: DateTime<Utc>,
}

fn period(
    state: &AppState,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<MenuPeriod, AppError> {
    let Query(query) = query.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    Ok(state.menus.period(query.month, query.year))
}

pub async fn hall_menu_handler(
    State(state): SharedState,
    Path(hall_name): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<MealRecord>>, AppError> {
    let period = period(&state, query)?;
    info!("Fetching menus for hall: {hall_name}, period: {period}");

    Ok(Json(state.menus.hall_menu(&hall_name, &period).await?))
}

pub async fn meal_slot_handler(
    State(state): SharedState,
    Path((hall_name, day, meal_type)): Path<(String, String, String)>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<MealRecord>, AppError> {
    let period = period(&state, query)?;
    info!("Fetching specific menu for hall: {hall_name}, day: {day}, mealType: {meal_type}");

    let meal = state
        .menus
        .meal_slot(&hall_name, &day, &meal_type, &period)
        .await?;

    Ok(Json(meal))
}

pub async fn all_halls_handler(
    State(state): SharedState,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<IndexMap<String, Vec<MealRecord>>>, AppError> {
    let period = period(&state, query)?;
    info!("Fetching all halls menus for {period}");

    Ok(Json(state.menus.all_halls(&period).await?))
}

pub async fn create_menu_handler(
    State(state): SharedState,
    payload: Result<Json<NewMealRecord>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    let meal = state
        .menus
        .create(payload)
        .await
        .map_err(AppError::rejected)?;

    Ok((StatusCode::CREATED, Json(meal)))
}

pub async fn update_menu_handler(
    State(state): SharedState,
    Path(id): Path<String>,
    payload: Result<Json<MealRecordUpdate>, JsonRejection>,
) -> Result<Json<MealRecord>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;
    info!("Updating menu item with ID: {id}");

    let meal = state
        .menus
        .update(&id, payload)
        .await
        .map_err(AppError::rejected)?;

    Ok(Json(meal))
}

pub async fn seed_handler(
    State(state): SharedState,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<SeedResponse>, AppError> {
    let period = period(&state, query)?;
    info!("Starting menu data seeding for {period}");

    let report = state.menus.seed(&period).await?;

    Ok(Json(SeedResponse {
        message: "Menu data seeded successfully",
        inserted: report.inserted,
        updated: report.updated,
    }))
}

pub async fn database_handler(
    State(state): SharedState,
) -> Result<Json<DatabaseOverview>, AppError> {
    info!("Checking database contents...");

    Ok(Json(state.menus.overview().await?))
}

pub async fn health_handler(State(state): SharedState) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Mess backend is running",
        server: "healthy",
        database: if state.menus.is_connected() {
            "connected"
        } else {
            "disconnected"
        },
        storage: state.menus.backend(),
        timestamp: Utc::now(),
    })
}
