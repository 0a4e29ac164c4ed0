use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("requested attendees {requested} exceed the available capacity of {available}")]
    CapacityExceeded {
        requested: u32,
        available: u32,
        capacity: u32,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("missing caller identity")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("listing not found: {0}")]
    ListingNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("business not found: {0}")]
    BusinessNotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::InvalidState(_) => "invalid_state",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::ListingNotFound(_) => "listing_not_found",
            Self::BookingNotFound(_) => "booking_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::BusinessNotFound(_) => "business_not_found",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "store_unavailable",
            Self::Serialization(_) => "serialization_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::CapacityExceeded { .. } | Self::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ListingNotFound(_)
            | Self::BookingNotFound(_)
            | Self::UserNotFound(_)
            | Self::BusinessNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            error!(error = %self, code, "request failed");
        }

        let details = match &self {
            Self::CapacityExceeded {
                requested,
                available,
                capacity,
            } => Some(serde_json::json!({
                "requested": requested,
                "available": available,
                "capacity": capacity
            })),
            _ => None,
        };

        let message = match &self {
            Self::Store(_) | Self::Serialization(_) | Self::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
