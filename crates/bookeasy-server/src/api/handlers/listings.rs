use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::extract::{ApiJson, ApiQuery};
use crate::auth::{require_role, Caller};
use crate::domain::{CreateListingRequest, Listing, ListingFilter, ListingPatch, Quote, QuoteQuery, Role};
use crate::error::Result;
use crate::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.listings.list(&filter).await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Listing>> {
    Ok(Json(state.listings.get(&id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<CreateListingRequest>,
) -> Result<impl IntoResponse> {
    require_role(&caller, Role::Business)?;

    let listing = state.listings.create(&caller.id, req).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ListingPatch>,
) -> Result<Json<Listing>> {
    Ok(Json(state.listings.update(&id, &caller, patch).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.listings.delete(&id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_own(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.listings.list_by_owner(&caller.id).await?))
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<QuoteQuery>,
) -> Result<Json<Quote>> {
    Ok(Json(state.bookings.quote(&id, query.attendees).await?))
}
