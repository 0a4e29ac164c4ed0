use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Error, Debug)]
#[error("invalid status value: {0:?}, expected one of pending, confirmed, cancelled, completed")]
pub struct ParseStatusError(pub String);

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Whether a booking in this status still counts against its slot.
    pub fn holds_capacity(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        match (self, next) {
            (from, to) if *from == to => true,
            (Pending, Confirmed | Cancelled | Completed) => true,
            (Confirmed, Completed | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// How status changes are policed. `Permissive` accepts any target status;
/// `Strict` follows [`BookingStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn allows(&self, from: BookingStatus, to: BookingStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => from.can_transition_to(to),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown status transition policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    /// Owner of the listing when the booking was made.
    pub business_id: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub attendees: u32,
    pub status: BookingStatus,
    pub total_paid: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl Booking {
    pub fn occupies(&self, listing_id: &str, date: NaiveDate, time: &str) -> bool {
        self.listing_id == listing_id
            && self.date == date
            && self.time == time
            && self.status.holds_capacity()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub listing_id: Option<String>,
    pub customer_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub attendees: Option<i64>,
    pub contact_info: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub attendees: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub listing_id: String,
    pub attendees: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub currency: String,
}
