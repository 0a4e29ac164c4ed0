use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::require_caller;
use crate::error::AppError;
use crate::AppState;

/// Resolves the caller and stores it as a request extension for handlers
/// behind this layer. Requests without an identity stop here.
pub async fn middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let resolved = state.identity.resolve(req.headers())?;
    let caller = require_caller(resolved.as_ref())?.clone();

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
