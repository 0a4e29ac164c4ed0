use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::extract::ApiJson;
use crate::auth::Caller;
use crate::domain::{Booking, CreateBookingRequest, UpdateStatusRequest};
use crate::error::Result;
use crate::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Booking>>> {
    Ok(Json(state.bookings.list_for_caller(&caller).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<impl IntoResponse> {
    let booking = state.bookings.create(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    Ok(Json(state.bookings.get(&id, &caller).await?))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Booking>> {
    let booking = state
        .bookings
        .update_status(&id, req.status.as_deref(), &caller)
        .await?;
    Ok(Json(booking))
}
