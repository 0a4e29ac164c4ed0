use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{non_blank, optional_text, required};
use crate::auth::{ensure_owner, require_role, Caller};
use crate::domain::{Business, CreateBusinessRequest, Role, UpdateBusinessRequest};
use crate::error::{AppError, Result};
use crate::store::{decode, decode_all, encode, Collection, Store};

#[derive(Clone)]
pub struct BusinessDirectory {
    store: Arc<dyn Store>,
}

impl BusinessDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller: &Caller, req: CreateBusinessRequest) -> Result<Business> {
        require_role(caller, Role::Business)?;

        let business = Business {
            id: Uuid::new_v4().to_string(),
            owner_id: caller.id.clone(),
            name: required(req.name, "name")?,
            description: optional_text(req.description).unwrap_or_default(),
            contact_info: optional_text(req.contact_info).unwrap_or_default(),
            address: optional_text(req.address).unwrap_or_default(),
            created_at: Utc::now(),
            business_type: optional_text(req.business_type),
            website: optional_text(req.website),
            logo_url: optional_text(req.logo_url),
        };

        self.store
            .create(Collection::Businesses, &business.id, encode(&business)?)
            .await?;

        info!(business_id = %business.id, owner_id = %business.owner_id, "business created");
        Ok(business)
    }

    pub async fn get(&self, id: &str) -> Result<Business> {
        let record = self
            .store
            .get(Collection::Businesses, id)
            .await?
            .ok_or_else(|| AppError::BusinessNotFound(id.to_string()))?;

        Ok(decode(Collection::Businesses, id, record)?)
    }

    pub async fn update(
        &self,
        id: &str,
        caller: &Caller,
        req: UpdateBusinessRequest,
    ) -> Result<Business> {
        let business = self.get(id).await?;
        ensure_owner(&business.owner_id, caller, "business")?;

        let patch = UpdateBusinessRequest {
            name: non_blank(req.name, "name")?,
            ..req
        };
        let merged = self
            .store
            .update(Collection::Businesses, id, encode(&patch)?)
            .await?
            .ok_or_else(|| AppError::BusinessNotFound(id.to_string()))?;

        Ok(decode(Collection::Businesses, id, merged)?)
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>> {
        let records = self.store.get_all(Collection::Businesses).await?;
        let businesses: Vec<Business> = decode_all(Collection::Businesses, records)?;
        Ok(businesses
            .into_iter()
            .filter(|b| b.owner_id == owner_id)
            .collect())
    }
}
