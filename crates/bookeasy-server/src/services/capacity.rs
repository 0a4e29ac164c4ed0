use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;

use crate::domain::Listing;
use crate::error::{AppError, Result};

/// `PerBooking` compares each request with the listing's static capacity.
/// `PerSlot` also counts attendees already committed to the same date and
/// time, and serializes creations per slot within this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapacityMode {
    #[default]
    PerBooking,
    PerSlot,
}

impl FromStr for CapacityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "per_booking" => Ok(Self::PerBooking),
            "per_slot" => Ok(Self::PerSlot),
            other => Err(format!("unknown capacity mode: {other}")),
        }
    }
}

pub fn check_capacity(listing: &Listing, requested: u32, committed: u32) -> Result<()> {
    let available = listing.capacity.saturating_sub(committed);
    if requested > available {
        return Err(AppError::CapacityExceeded {
            requested,
            available,
            capacity: listing.capacity,
        });
    }
    Ok(())
}

type SlotKey = (String, NaiveDate, String);
type SlotLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub struct CapacityGuard {
    mode: CapacityMode,
    slots: Mutex<HashMap<SlotKey, SlotLock>>,
}

impl CapacityGuard {
    pub fn new(mode: CapacityMode) -> Self {
        Self {
            mode,
            slots: Mutex::default(),
        }
    }

    pub fn mode(&self) -> CapacityMode {
        self.mode
    }

    /// Holds the slot for the duration of a read-check-write sequence.
    /// Returns `None` in `PerBooking` mode, where creations are not serialized.
    pub async fn hold(&self, listing_id: &str, date: NaiveDate, time: &str) -> Option<SlotHold<'_>> {
        if self.mode == CapacityMode::PerBooking {
            return None;
        }

        let key = (listing_id.to_string(), date, time.to_string());
        let slot = self.slots().entry(key.clone()).or_default().clone();
        let lock = slot.lock_owned().await;

        Some(SlotHold {
            owner: self,
            key,
            lock: Some(lock),
        })
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<SlotKey, SlotLock>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    fn tracked_slots(&self) -> usize {
        self.slots().len()
    }
}

/// Exclusive hold on one slot. The slot's entry is dropped with the last
/// hold that references it.
pub struct SlotHold<'a> {
    owner: &'a CapacityGuard,
    key: SlotKey,
    lock: Option<OwnedMutexGuard<()>>,
}

impl Drop for SlotHold<'_> {
    fn drop(&mut self) {
        // The owned guard keeps its own reference to the slot lock.
        drop(self.lock.take());

        let mut slots = self.owner.slots();
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn listing(capacity: u32) -> Listing {
        Listing {
            id: "l1".into(),
            business_id: "B1".into(),
            title: "Hall".into(),
            description: "large hall".into(),
            listing_type: "Venue".into(),
            price: Decimal::from(10),
            currency: "INR".into(),
            capacity,
            active: true,
            location: "Pune".into(),
            images: vec![],
            tags: Default::default(),
            amenities: Default::default(),
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn static_check_allows_up_to_capacity() {
        assert!(check_capacity(&listing(5), 5, 0).is_ok());
        assert!(matches!(
            check_capacity(&listing(5), 6, 0),
            Err(AppError::CapacityExceeded {
                requested: 6,
                available: 5,
                capacity: 5
            })
        ));
    }

    #[test]
    fn committed_attendees_reduce_availability() {
        assert!(check_capacity(&listing(5), 2, 3).is_ok());
        assert!(matches!(
            check_capacity(&listing(5), 3, 3),
            Err(AppError::CapacityExceeded { available: 2, .. })
        ));
        assert!(check_capacity(&listing(5), 1, 9).is_err());
    }

    #[tokio::test]
    async fn per_booking_mode_does_not_serialize() {
        let guard = CapacityGuard::new(CapacityMode::PerBooking);
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(guard.hold("l1", date, "10:00 AM").await.is_none());
    }

    #[tokio::test]
    async fn per_slot_mode_holds_one_writer_per_slot() {
        let guard = Arc::new(CapacityGuard::new(CapacityMode::PerSlot));
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let held = guard.hold("l1", date, "10:00 AM").await;
        assert!(held.is_some());

        let contender = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.hold("l1", date, "10:00 AM").await.is_some() })
        };
        let other_slot = guard.hold("l1", date, "11:00 AM").await;
        assert!(other_slot.is_some());

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(held);
        assert!(contender.await.unwrap());
    }

    #[tokio::test]
    async fn released_slots_are_forgotten() {
        let guard = CapacityGuard::new(CapacityMode::PerSlot);
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        for hour in 0..100 {
            let hold = guard.hold("l1", date, &format!("{hour}:00")).await;
            assert!(hold.is_some());
        }
        assert_eq!(guard.tracked_slots(), 0);

        let first = guard.hold("l1", date, "10:00 AM").await;
        let second = guard.hold("l2", date, "10:00 AM").await;
        assert_eq!(guard.tracked_slots(), 2);

        drop(first);
        drop(second);
        assert_eq!(guard.tracked_slots(), 0);
    }

    #[tokio::test]
    async fn slot_with_waiter_outlives_release() {
        let guard = Arc::new(CapacityGuard::new(CapacityMode::PerSlot));
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let held = guard.hold("l1", date, "10:00 AM").await;
        let waiter = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.hold("l1", date, "10:00 AM").await.is_some() })
        };
        tokio::task::yield_now().await;

        drop(held);
        assert_eq!(guard.tracked_slots(), 1);

        assert!(waiter.await.unwrap());
        assert_eq!(guard.tracked_slots(), 0);
    }
}
