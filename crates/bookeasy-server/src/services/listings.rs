use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{non_blank, positive_count, pricing, required};
use crate::auth::{ensure_owner, Caller};
use crate::domain::{Booking, CreateListingRequest, Listing, ListingFilter, ListingPatch};
use crate::error::{AppError, Result};
use crate::store::{decode, decode_all, encode, Collection, Store};

#[derive(Clone)]
pub struct ListingRegistry {
    store: Arc<dyn Store>,
    default_currency: String,
}

impl ListingRegistry {
    pub fn new(store: Arc<dyn Store>, default_currency: impl Into<String>) -> Self {
        Self {
            store,
            default_currency: default_currency.into(),
        }
    }

    pub async fn create(&self, business_id: &str, req: CreateListingRequest) -> Result<Listing> {
        let title = required(req.title, "title")?;
        let description = required(req.description, "description")?;
        let listing_type = required(req.listing_type, "type")?;
        let location = required(req.location, "location")?;
        let price = positive_price(req.price.ok_or_else(|| {
            AppError::Validation("price is required".into())
        })?)?;
        let capacity = positive_count(
            req.capacity
                .ok_or_else(|| AppError::Validation("capacity is required".into()))?,
            "capacity",
        )?;
        let currency = non_blank(req.currency, "currency")?
            .unwrap_or_else(|| self.default_currency.clone());
        pricing::total_for(price, capacity)?;

        let listing = Listing {
            id: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            title,
            description,
            listing_type,
            price,
            currency,
            capacity,
            active: true,
            location,
            images: req.images.unwrap_or_default(),
            tags: normalize_tags(req.tags.unwrap_or_default()),
            amenities: normalize_tags(req.amenities.unwrap_or_default()),
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        };

        self.store
            .create(Collection::Listings, &listing.id, encode(&listing)?)
            .await?;

        info!(listing_id = %listing.id, business_id, "listing created");
        Ok(listing)
    }

    pub async fn get(&self, id: &str) -> Result<Listing> {
        let record = self
            .store
            .get(Collection::Listings, id)
            .await?
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))?;

        Ok(decode(Collection::Listings, id, record)?)
    }

    pub async fn update(&self, id: &str, caller: &Caller, patch: ListingPatch) -> Result<Listing> {
        let listing = self.get(id).await?;
        ensure_owner(&listing.business_id, caller, "listing")?;

        let immutable = patch.immutable_fields();
        if !immutable.is_empty() {
            return Err(AppError::Validation(format!(
                "cannot modify {}",
                immutable.join(", ")
            )));
        }

        let patch = validate_patch(patch)?;
        let capacity = match patch.capacity {
            Some(c) => positive_count(c, "capacity")?,
            None => listing.capacity,
        };
        pricing::total_for(patch.price.unwrap_or(listing.price), capacity)?;

        let merged = self
            .store
            .update(Collection::Listings, id, encode(&patch)?)
            .await?
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))?;

        info!(listing_id = %id, business_id = %caller.id, "listing updated");
        Ok(decode(Collection::Listings, id, merged)?)
    }

    /// Deletes unconditionally. Bookings that reference the listing are left
    /// in place and keep their snapshot of it.
    pub async fn delete(&self, id: &str, caller: &Caller) -> Result<()> {
        let listing = self.get(id).await?;
        ensure_owner(&listing.business_id, caller, "listing")?;

        let orphaned = self.bookings_referencing(id).await;

        self.store.delete(Collection::Listings, id).await?;
        info!(listing_id = %id, business_id = %caller.id, "listing deleted");

        match orphaned {
            Ok(0) => {}
            Ok(orphaned) => {
                warn!(listing_id = %id, orphaned, "deleted listing is still referenced by bookings");
            }
            Err(e) => {
                error!(listing_id = %id, error = %e, "could not count bookings of deleted listing");
            }
        }

        Ok(())
    }

    async fn bookings_referencing(&self, listing_id: &str) -> Result<usize> {
        let bookings: Vec<Booking> = decode_all(
            Collection::Bookings,
            self.store.get_all(Collection::Bookings).await?,
        )?;
        Ok(bookings.iter().filter(|b| b.listing_id == listing_id).count())
    }

    /// Public listing query: active listings satisfying every filter.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|l| filter.matches(l) && l.active)
            .collect())
    }

    /// Every listing owned by `business_id`, active or not.
    pub async fn list_by_owner(&self, business_id: &str) -> Result<Vec<Listing>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|l| l.business_id == business_id)
            .collect())
    }

    pub(crate) async fn all(&self) -> Result<Vec<Listing>> {
        let records = self.store.get_all(Collection::Listings).await?;
        Ok(decode_all(Collection::Listings, records)?)
    }
}

fn positive_price(price: Decimal) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be positive".into()));
    }
    Ok(price)
}

fn normalize_tags(tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_patch(patch: ListingPatch) -> Result<ListingPatch> {
    Ok(ListingPatch {
        title: non_blank(patch.title, "title")?,
        description: non_blank(patch.description, "description")?,
        listing_type: non_blank(patch.listing_type, "type")?,
        location: non_blank(patch.location, "location")?,
        currency: non_blank(patch.currency, "currency")?,
        price: patch.price.map(positive_price).transpose()?,
        capacity: patch
            .capacity
            .map(|c| positive_count(c, "capacity").map(i64::from))
            .transpose()?,
        tags: patch.tags.map(normalize_tags),
        amenities: patch.amenities.map(normalize_tags),
        ..patch
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemoryStore, Record, StoreError, StoreResult};

    /// Delegates to a `MemoryStore` but cannot read the bookings collection.
    #[derive(Default)]
    struct BookingsUnreadable(MemoryStore);

    #[async_trait]
    impl Store for BookingsUnreadable {
        async fn create(&self, collection: Collection, id: &str, record: Record) -> StoreResult<()> {
            self.0.create(collection, id, record).await
        }

        async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
            self.0.get(collection, id).await
        }

        async fn get_all(&self, collection: Collection) -> StoreResult<BTreeMap<String, Record>> {
            if collection == Collection::Bookings {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.0.get_all(collection).await
        }

        async fn update(
            &self,
            collection: Collection,
            id: &str,
            partial: Record,
        ) -> StoreResult<Option<Record>> {
            self.0.update(collection, id, partial).await
        }

        async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
            self.0.delete(collection, id).await
        }

        async fn ping(&self) -> StoreResult<()> {
            self.0.ping().await
        }
    }

    fn registry() -> ListingRegistry {
        ListingRegistry::new(Arc::new(MemoryStore::new()), "INR")
    }

    fn studio_request() -> CreateListingRequest {
        CreateListingRequest {
            title: Some("Studio A".into()),
            description: Some("bright room".into()),
            listing_type: Some("Studio".into()),
            price: Some(Decimal::from(100)),
            capacity: Some(5),
            location: Some("NYC".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_sets_defaults() {
        let listing = registry().create("B1", studio_request()).await.unwrap();

        assert_eq!(listing.business_id, "B1");
        assert!(listing.active);
        assert_eq!(listing.rating, 0.0);
        assert_eq!(listing.review_count, 0);
        assert_eq!(listing.currency, "INR");
    }

    #[tokio::test]
    async fn create_rejects_non_positive_price_and_capacity() {
        let registry = registry();

        let mut req = studio_request();
        req.price = Some(Decimal::ZERO);
        assert!(matches!(
            registry.create("B1", req).await,
            Err(AppError::Validation(_))
        ));

        let mut req = studio_request();
        req.capacity = Some(-2);
        assert!(matches!(
            registry.create("B1", req).await,
            Err(AppError::Validation(_))
        ));

        let mut req = studio_request();
        req.location = Some("   ".into());
        assert!(matches!(
            registry.create("B1", req).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_refuses_immutable_fields() {
        let registry = registry();
        let listing = registry.create("B1", studio_request()).await.unwrap();

        let patch: ListingPatch =
            serde_json::from_value(serde_json::json!({"businessId": "B2"})).unwrap();
        let err = registry
            .update(&listing.id, &Caller::business("B1"), patch)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(registry.get(&listing.id).await.unwrap().business_id, "B1");
    }

    #[tokio::test]
    async fn update_merges_supplied_fields_only() {
        let registry = registry();
        let listing = registry.create("B1", studio_request()).await.unwrap();

        let patch = ListingPatch {
            price: Some(Decimal::from(120)),
            active: Some(false),
            ..Default::default()
        };
        let updated = registry
            .update(&listing.id, &Caller::business("B1"), patch)
            .await
            .unwrap();

        assert_eq!(updated.price, Decimal::from(120));
        assert!(!updated.active);
        assert_eq!(updated.title, "Studio A");
        assert_eq!(updated.created_at, listing.created_at);
    }

    #[tokio::test]
    async fn owner_listing_includes_inactive() {
        let registry = registry();
        let listing = registry.create("B1", studio_request()).await.unwrap();
        registry.create("B2", studio_request()).await.unwrap();

        let patch = ListingPatch {
            active: Some(false),
            ..Default::default()
        };
        registry
            .update(&listing.id, &Caller::business("B1"), patch)
            .await
            .unwrap();

        assert_eq!(registry.list_by_owner("B1").await.unwrap().len(), 1);
        assert_eq!(registry.list(&ListingFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_price_that_cannot_be_totalled() {
        let mut req = studio_request();
        req.price = Some(Decimal::MAX);

        assert!(matches!(
            registry().create("B1", req).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_capacity_that_cannot_be_totalled() {
        let registry = registry();
        let mut req = studio_request();
        req.price = Some(Decimal::MAX);
        req.capacity = Some(1);
        let listing = registry.create("B1", req).await.unwrap();

        let patch = ListingPatch {
            capacity: Some(5),
            ..Default::default()
        };
        let err = registry
            .update(&listing.id, &Caller::business("B1"), patch)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(registry.get(&listing.id).await.unwrap().capacity, 1);
    }

    #[tokio::test]
    async fn delete_succeeds_when_bookings_cannot_be_counted() {
        let registry = ListingRegistry::new(Arc::new(BookingsUnreadable::default()), "INR");
        let listing = registry.create("B1", studio_request()).await.unwrap();

        registry
            .delete(&listing.id, &Caller::business("B1"))
            .await
            .unwrap();

        assert!(matches!(
            registry.get(&listing.id).await,
            Err(AppError::ListingNotFound(_))
        ));
    }
}
