use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::capacity::{check_capacity, CapacityGuard, CapacityMode};
use super::listings::ListingRegistry;
use super::{optional_text, positive_count, pricing, required};
use crate::auth::{ensure_owner, Caller};
use crate::domain::{
    Booking, BookingStatus, CreateBookingRequest, Listing, ParseStatusError, Quote, Role,
    TransitionPolicy,
};
use crate::error::{AppError, Result};
use crate::store::{decode, decode_all, encode, Collection, Record, Store};

struct BookingDraft {
    listing_id: String,
    customer_name: String,
    date: NaiveDate,
    time: String,
    attendees: u32,
    contact_info: String,
    special_requests: Option<String>,
}

impl TryFrom<CreateBookingRequest> for BookingDraft {
    type Error = AppError;

    fn try_from(req: CreateBookingRequest) -> Result<Self> {
        let listing_id = required(req.listing_id, "listingId")?;
        let customer_name = required(req.customer_name, "customerName")?;
        let date = req
            .date
            .ok_or_else(|| AppError::Validation("date is required".into()))?;
        let time = required(req.time, "time")?;
        let attendees = positive_count(
            req.attendees
                .ok_or_else(|| AppError::Validation("attendees is required".into()))?,
            "attendees",
        )?;

        Ok(Self {
            listing_id,
            customer_name,
            date,
            time,
            attendees,
            contact_info: optional_text(req.contact_info).unwrap_or_default(),
            special_requests: optional_text(req.special_requests),
        })
    }
}

pub struct BookingEngine {
    store: Arc<dyn Store>,
    listings: ListingRegistry,
    capacity: CapacityGuard,
    transitions: TransitionPolicy,
}

impl BookingEngine {
    pub fn new(
        store: Arc<dyn Store>,
        listings: ListingRegistry,
        capacity: CapacityMode,
        transitions: TransitionPolicy,
    ) -> Self {
        Self {
            store,
            listings,
            capacity: CapacityGuard::new(capacity),
            transitions,
        }
    }

    pub async fn create(&self, caller: &Caller, req: CreateBookingRequest) -> Result<Booking> {
        let draft = BookingDraft::try_from(req)?;

        let _slot = self
            .capacity
            .hold(&draft.listing_id, draft.date, &draft.time)
            .await;

        let listing = self.listings.get(&draft.listing_id).await?;
        ensure_bookable(&listing)?;

        let committed = match self.capacity.mode() {
            CapacityMode::PerBooking => 0,
            CapacityMode::PerSlot => {
                self.committed_attendees(&listing.id, draft.date, &draft.time)
                    .await?
            }
        };
        check_capacity(&listing, draft.attendees, committed)?;

        let quote = pricing::quote(&listing, draft.attendees)?;
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            listing_id: listing.id,
            user_id: caller.id.clone(),
            business_id: listing.business_id,
            customer_name: draft.customer_name,
            date: draft.date,
            time: draft.time,
            attendees: draft.attendees,
            status: BookingStatus::Pending,
            total_paid: quote.total_price,
            currency: quote.currency,
            created_at: Utc::now(),
            updated_at: None,
            contact_info: draft.contact_info,
            special_requests: draft.special_requests,
        };

        self.store
            .create(Collection::Bookings, &booking.id, encode(&booking)?)
            .await?;

        info!(
            booking_id = %booking.id,
            listing_id = %booking.listing_id,
            user_id = %booking.user_id,
            attendees = booking.attendees,
            "booking created"
        );
        Ok(booking)
    }

    /// Visible to the customer who made the booking and to the owning business.
    pub async fn get(&self, id: &str, caller: &Caller) -> Result<Booking> {
        let booking = self.load(id).await?;
        if booking.user_id != caller.id && booking.business_id != caller.id {
            return Err(AppError::Forbidden(
                "not authorized to view this booking".into(),
            ));
        }
        Ok(booking)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: Option<&str>,
        caller: &Caller,
    ) -> Result<Booking> {
        let booking = self.load(id).await?;
        ensure_owner(&booking.business_id, caller, "booking")?;

        let next: BookingStatus = status
            .ok_or_else(|| AppError::Validation("status is required".into()))?
            .parse()
            .map_err(|e: ParseStatusError| AppError::Validation(e.to_string()))?;

        if !self.transitions.allows(booking.status, next) {
            return Err(AppError::InvalidState(format!(
                "cannot move booking from {} to {}",
                booking.status, next
            )));
        }

        let mut patch = Record::new();
        patch.insert("status".into(), json!(next));
        patch.insert("updatedAt".into(), json!(Utc::now()));
        let merged = self
            .store
            .update(Collection::Bookings, id, patch)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        info!(booking_id = %id, from = %booking.status, to = %next, "booking status changed");
        Ok(decode(Collection::Bookings, id, merged)?)
    }

    /// Businesses see bookings made against them; everyone else sees their own.
    pub async fn list_for_caller(&self, caller: &Caller) -> Result<Vec<Booking>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|b| match caller.role {
                Role::Business => b.business_id == caller.id,
                Role::Customer => b.user_id == caller.id,
            })
            .collect())
    }

    /// Pre-booking estimate under the same pricing policy as `create`.
    pub async fn quote(&self, listing_id: &str, attendees: Option<i64>) -> Result<Quote> {
        let attendees = positive_count(
            attendees.ok_or_else(|| AppError::Validation("attendees is required".into()))?,
            "attendees",
        )?;

        let listing = self.listings.get(listing_id).await?;
        ensure_bookable(&listing)?;
        check_capacity(&listing, attendees, 0)?;

        pricing::quote(&listing, attendees)
    }

    async fn committed_attendees(
        &self,
        listing_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<u32> {
        Ok(self
            .all()
            .await?
            .iter()
            .filter(|b| b.occupies(listing_id, date, time))
            .map(|b| b.attendees)
            .fold(0u32, u32::saturating_add))
    }

    async fn load(&self, id: &str) -> Result<Booking> {
        let record = self
            .store
            .get(Collection::Bookings, id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        Ok(decode(Collection::Bookings, id, record)?)
    }

    async fn all(&self) -> Result<Vec<Booking>> {
        let records = self.store.get_all(Collection::Bookings).await?;
        Ok(decode_all(Collection::Bookings, records)?)
    }
}

fn ensure_bookable(listing: &Listing) -> Result<()> {
    if !listing.active {
        return Err(AppError::InvalidState(
            "this listing is not currently available for booking".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::CreateListingRequest;
    use crate::store::MemoryStore;

    async fn engine(capacity: CapacityMode, transitions: TransitionPolicy) -> (BookingEngine, Listing) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let listings = ListingRegistry::new(store.clone(), "INR");
        let listing = listings
            .create(
                "B1",
                CreateListingRequest {
                    title: Some("Studio A".into()),
                    description: Some("bright room".into()),
                    listing_type: Some("Studio".into()),
                    price: Some(Decimal::from(100)),
                    capacity: Some(5),
                    location: Some("NYC".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        (
            BookingEngine::new(store, listings, capacity, transitions),
            listing,
        )
    }

    fn request(listing_id: &str, attendees: i64) -> CreateBookingRequest {
        CreateBookingRequest {
            listing_id: Some(listing_id.into()),
            customer_name: Some("Asha".into()),
            date: NaiveDate::from_ymd_opt(2025, 6, 1),
            time: Some("10:00 AM".into()),
            attendees: Some(attendees),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn per_booking_mode_lets_a_slot_overbook() {
        let (engine, listing) = engine(CapacityMode::PerBooking, TransitionPolicy::Permissive).await;
        let caller = Caller::customer("C1");

        engine.create(&caller, request(&listing.id, 4)).await.unwrap();
        engine.create(&caller, request(&listing.id, 4)).await.unwrap();
    }

    #[tokio::test]
    async fn per_slot_mode_counts_committed_attendees() {
        let (engine, listing) = engine(CapacityMode::PerSlot, TransitionPolicy::Permissive).await;
        let caller = Caller::customer("C1");

        let first = engine.create(&caller, request(&listing.id, 4)).await.unwrap();
        let err = engine
            .create(&caller, request(&listing.id, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded { available: 1, .. }));

        engine
            .update_status(&first.id, Some("cancelled"), &Caller::business("B1"))
            .await
            .unwrap();
        engine.create(&caller, request(&listing.id, 5)).await.unwrap();
    }

    #[tokio::test]
    async fn total_paid_is_charged_per_attendee() {
        let (engine, listing) = engine(CapacityMode::PerBooking, TransitionPolicy::Permissive).await;
        let booking = engine
            .create(&Caller::customer("C1"), request(&listing.id, 3))
            .await
            .unwrap();

        assert_eq!(booking.total_paid, Decimal::from(300));
        assert_eq!(booking.business_id, "B1");
        assert_eq!(booking.user_id, "C1");
    }

    #[tokio::test]
    async fn strict_policy_rejects_reopening() {
        let (engine, listing) = engine(CapacityMode::PerBooking, TransitionPolicy::Strict).await;
        let owner = Caller::business("B1");
        let booking = engine
            .create(&Caller::customer("C1"), request(&listing.id, 2))
            .await
            .unwrap();

        engine
            .update_status(&booking.id, Some("cancelled"), &owner)
            .await
            .unwrap();
        let err = engine
            .update_status(&booking.id, Some("pending"), &owner)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn invalid_status_leaves_booking_unchanged() {
        let (engine, listing) = engine(CapacityMode::PerBooking, TransitionPolicy::Permissive).await;
        let owner = Caller::business("B1");
        let booking = engine
            .create(&Caller::customer("C1"), request(&listing.id, 2))
            .await
            .unwrap();

        let err = engine
            .update_status(&booking.id, Some("archived"), &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = engine.get(&booking.id, &owner).await.unwrap();
        assert_eq!(stored, booking);
    }
}
