use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::extract::ApiQuery;
use crate::domain::{SearchQuery, SearchResult};
use crate::error::Result;
use crate::AppState;

pub async fn search(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>> {
    Ok(Json(state.search.search(query.query.as_deref()).await?))
}
