use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{bookings, businesses, health, listings, search, users};
use crate::api::middleware::auth;
use crate::AppState;

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "not_found",
                "message": "The requested endpoint does not exist"
            }
        })),
    )
}

pub fn build(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let protected = Router::new()
        .route("/listings", post(listings::create))
        .route("/listings/:id", put(listings::update).delete(listings::delete))
        .route("/business/listings", get(listings::list_own))
        .route("/business/profile", get(businesses::list_own))
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route("/bookings/:id", get(bookings::get))
        .route("/bookings/:id/status", put(bookings::update_status))
        .route("/users/me", get(users::me))
        .route("/users/:id", get(users::get).put(users::update))
        .route("/businesses", post(businesses::create))
        .route("/businesses/:id", put(businesses::update))
        .layer(from_fn_with_state(state.clone(), auth::middleware));

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/listings", get(listings::list))
        .route("/listings/:id", get(listings::get))
        .route("/listings/:id/quote", get(listings::quote))
        .route("/search", get(search::search))
        .route("/users/register", post(users::register))
        .route("/businesses/:id", get(businesses::get));

    let api = Router::new()
        .nest("/api", public.merge(protected))
        .fallback(fallback);

    api.with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
}
