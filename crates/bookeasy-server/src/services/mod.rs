pub mod bookings;
pub mod businesses;
pub mod capacity;
pub mod listings;
pub mod pricing;
pub mod search;
pub mod users;

pub use bookings::BookingEngine;
pub use businesses::BusinessDirectory;
pub use capacity::{check_capacity, CapacityGuard, CapacityMode};
pub use listings::ListingRegistry;
pub use search::SearchIndex;
pub use users::UserDirectory;

use crate::error::{AppError, Result};

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Trims a supplied value and refuses blanks; `None` passes through.
fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => required(Some(v), field).map(Some),
    }
}

fn positive_count(value: i64, field: &str) -> Result<u32> {
    if value <= 0 {
        return Err(AppError::Validation(format!(
            "{field} must be a positive integer"
        )));
    }
    u32::try_from(value).map_err(|_| AppError::Validation(format!("{field} is too large")))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
