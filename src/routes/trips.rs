// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip CRUD routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Trip, TripRecord};
use crate::routes::extract::{IdPath, ValidatedJson};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/", get(list_trips).post(create_trip))
        .route(
            "/trips/{id}",
            get(get_trip).put(replace_trip).delete(delete_trip),
        )
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

async fn list_trips(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TripRecord>>> {
    Ok(Json(state.db.list_trips().await?))
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Json<TripRecord>> {
    Ok(Json(state.db.get_trip(&id).await?))
}

async fn create_trip(
    State(state): State<Arc<AppState>>,
    ValidatedJson(trip): ValidatedJson<Trip>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state.db.create_trip(trip).await?;
    tracing::info!(trip_id = %id, "Trip created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Trip created".to_string(),
            id: id.to_string(),
        }),
    ))
}

/// Replace a trip wholesale. Fields missing from the body are not kept.
async fn replace_trip(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    ValidatedJson(trip): ValidatedJson<Trip>,
) -> Result<Json<MessageResponse>> {
    state.db.replace_trip(&id, trip).await?;
    tracing::info!(trip_id = %id, "Trip replaced");

    Ok(Json(MessageResponse {
        message: "Trip updated".to_string(),
    }))
}

async fn delete_trip(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>> {
    state.db.delete_trip(&id).await?;
    tracing::info!(trip_id = %id, "Trip deleted");

    Ok(Json(MessageResponse {
        message: "Trip deleted".to_string(),
    }))
}
