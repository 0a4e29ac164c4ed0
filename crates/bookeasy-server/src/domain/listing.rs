use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub business_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub listing_type: String,
    pub price: Decimal,
    pub currency: String,
    pub capacity: u32,
    pub active: bool,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "reviews")]
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Case-insensitive substring match over title, description, type,
    /// location and tags. `needle` must already be lower-cased.
    pub fn matches_query(&self, needle: &str) -> bool {
        [
            &self.title,
            &self.description,
            &self.listing_type,
            &self.location,
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub capacity: Option<i64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

/// Owner-supplied changes to a listing. Serializes to exactly the fields that
/// were supplied, so it can be merged into the stored record as is. The
/// immutable keys are captured only to be refused.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(default, skip_serializing)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing)]
    pub business_id: Option<Value>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl ListingPatch {
    /// Names of immutable fields the caller tried to set.
    pub fn immutable_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.id.is_some() {
            fields.push("id");
        }
        if self.business_id.is_some() {
            fields.push("businessId");
        }
        if self.created_at.is_some() {
            fields.push("createdAt");
        }
        fields
    }
}

/// Public listing filters. Each supplied field narrows the result; blank
/// values count as not supplied. `amenities` is a comma-separated list and
/// every entry must be present on the listing.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub capacity: Option<u32>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub amenities: BTreeSet<String>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        let listing_type = non_blank(&self.listing_type);
        let location = non_blank(&self.location).map(str::to_lowercase);

        listing_type.map_or(true, |t| listing.listing_type == t)
            && location.map_or(true, |l| listing.location.to_lowercase().contains(&l))
            && self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
            && self.capacity.map_or(true, |c| listing.capacity >= c)
            && self.amenities.iter().all(|wanted| {
                listing
                    .amenities
                    .iter()
                    .any(|a| a.to_lowercase() == *wanted)
            })
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Lower-cased, trimmed entries of a comma-separated list.
fn comma_separated<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .unwrap_or_default()
        .split(',')
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub listing_type: String,
    pub price: Decimal,
    pub currency: String,
    pub location: String,
    pub image: String,
}

impl From<&Listing> for SearchResult {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id.clone(),
            title: l.title.clone(),
            listing_type: l.listing_type.clone(),
            price: l.price,
            currency: l.currency.clone(),
            location: l.location.clone(),
            image: l.images.first().cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn studio(price: i64, capacity: u32) -> Listing {
        Listing {
            id: "l1".into(),
            business_id: "B1".into(),
            title: "Studio A".into(),
            description: "bright room".into(),
            listing_type: "Studio".into(),
            price: Decimal::from(price),
            currency: "INR".into(),
            capacity,
            active: true,
            location: "New York City".into(),
            images: vec![],
            tags: ["photo".to_string(), "daylight".to_string()].into(),
            amenities: ["WiFi".to_string(), "Parking".to_string()].into(),
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ListingFilter::default().matches(&studio(100, 5)));
    }

    #[test]
    fn filters_compose_as_conjunction() {
        let filter = ListingFilter {
            listing_type: Some("Studio".into()),
            location: Some("york".into()),
            min_price: Some(Decimal::from(50)),
            max_price: Some(Decimal::from(150)),
            capacity: Some(5),
            ..Default::default()
        };
        assert!(filter.matches(&studio(100, 5)));
        assert!(!filter.matches(&studio(200, 5)));
        assert!(!filter.matches(&studio(100, 4)));
    }

    #[test]
    fn type_match_is_exact() {
        let filter = ListingFilter {
            listing_type: Some("studio".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&studio(100, 5)));
    }

    #[test]
    fn blank_strings_impose_no_constraint() {
        let filter = ListingFilter {
            listing_type: Some("".into()),
            location: Some("  ".into()),
            ..Default::default()
        };
        assert!(filter.matches(&studio(100, 5)));
    }

    #[test]
    fn amenities_must_all_be_present() {
        let filter = ListingFilter {
            amenities: ["wifi".to_string(), "parking".to_string()].into(),
            ..Default::default()
        };
        assert!(filter.matches(&studio(100, 5)));

        let filter = ListingFilter {
            amenities: ["wifi".to_string(), "projector".to_string()].into(),
            ..Default::default()
        };
        assert!(!filter.matches(&studio(100, 5)));
    }

    #[test]
    fn blank_numeric_params_deserialize_as_absent() {
        let filter: ListingFilter = serde_json::from_value(serde_json::json!({
            "minPrice": "",
            "maxPrice": " ",
            "capacity": "",
            "amenities": " , "
        }))
        .unwrap();

        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.capacity, None);
        assert!(filter.amenities.is_empty());
    }

    #[test]
    fn numeric_params_still_parse() {
        let filter: ListingFilter = serde_json::from_value(serde_json::json!({
            "minPrice": "50",
            "capacity": "4",
            "amenities": "WiFi, Parking"
        }))
        .unwrap();

        assert_eq!(filter.min_price, Some(Decimal::from(50)));
        assert_eq!(filter.capacity, Some(4));
        assert_eq!(filter.amenities.len(), 2);
        assert!(filter.amenities.contains("wifi"));
    }

    #[test]
    fn query_matches_tags_case_insensitively() {
        let listing = studio(100, 5);
        assert!(listing.matches_query("daylight"));
        assert!(listing.matches_query("new york"));
        assert!(!listing.matches_query("rooftop"));
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch: ListingPatch =
            serde_json::from_value(serde_json::json!({"title": "Studio B", "id": "x"})).unwrap();
        assert_eq!(patch.immutable_fields(), vec!["id"]);

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"title": "Studio B"}));
    }
}
