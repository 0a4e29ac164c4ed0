use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::extract::ApiJson;
use crate::auth::Caller;
use crate::domain::{RegisterUserRequest, UpdateUserRequest, User};
use crate::error::Result;
use crate::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> Result<impl IntoResponse> {
    let user = state.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get(&caller.id).await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get(&id).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.users.update(&id, &caller, req).await?))
}
