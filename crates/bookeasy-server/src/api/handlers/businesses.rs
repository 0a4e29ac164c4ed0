use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::extract::ApiJson;
use crate::auth::Caller;
use crate::domain::{Business, CreateBusinessRequest, UpdateBusinessRequest};
use crate::error::Result;
use crate::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<CreateBusinessRequest>,
) -> Result<impl IntoResponse> {
    let business = state.businesses.create(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Business>> {
    Ok(Json(state.businesses.get(&id).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBusinessRequest>,
) -> Result<Json<Business>> {
    Ok(Json(state.businesses.update(&id, &caller, req).await?))
}

pub async fn list_own(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Business>>> {
    Ok(Json(state.businesses.list_by_owner(&caller.id).await?))
}
