use super::listings::ListingRegistry;
use crate::domain::SearchResult;
use crate::error::{AppError, Result};

/// Linear scan over every listing; there is no index behind it.
#[derive(Clone)]
pub struct SearchIndex {
    listings: ListingRegistry,
}

impl SearchIndex {
    pub fn new(listings: ListingRegistry) -> Self {
        Self { listings }
    }

    pub async fn search(&self, query: Option<&str>) -> Result<Vec<SearchResult>> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::Validation("search query is required".into()))?;

        Ok(self
            .listings
            .all()
            .await?
            .iter()
            .filter(|l| l.active && l.matches_query(&needle))
            .map(SearchResult::from)
            .collect())
    }
}
