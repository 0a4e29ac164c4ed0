use rust_decimal::Decimal;

use crate::domain::{Listing, Quote};
use crate::error::{AppError, Result};

/// The one pricing policy: the listing price is charged per attendee. Booking
/// creation and the pre-booking estimate both go through here.
pub fn quote(listing: &Listing, attendees: u32) -> Result<Quote> {
    let total_price = total_for(listing.price, attendees)?;

    Ok(Quote {
        listing_id: listing.id.clone(),
        attendees,
        unit_price: listing.price,
        total_price,
        currency: listing.currency.clone(),
    })
}

/// `price × attendees`, refusing totals that do not fit in a `Decimal`.
pub fn total_for(price: Decimal, attendees: u32) -> Result<Decimal> {
    price
        .checked_mul(Decimal::from(attendees))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "total for {attendees} attendees at {price} is out of range"
            ))
        })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn listing(price: Decimal) -> Listing {
        Listing {
            id: "l1".into(),
            business_id: "B1".into(),
            title: "Studio A".into(),
            description: "bright room".into(),
            listing_type: "Studio".into(),
            price,
            currency: "USD".into(),
            capacity: 10,
            active: true,
            location: "NYC".into(),
            images: vec![],
            tags: Default::default(),
            amenities: Default::default(),
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_price_times_attendees() {
        let quote = quote(&listing(Decimal::new(12_550, 2)), 3).unwrap();

        assert_eq!(quote.unit_price, Decimal::new(12_550, 2));
        assert_eq!(quote.total_price, Decimal::new(37_650, 2));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn overflowing_total_is_a_validation_error() {
        let err = quote(&listing(Decimal::MAX), 2).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
