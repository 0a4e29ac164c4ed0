use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// List active listings
    List {
        #[arg(long = "type")]
        listing_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        #[arg(long, help = "Minimum capacity")]
        capacity: Option<u32>,
        #[arg(long = "amenity", help = "Required amenity (repeatable)")]
        amenities: Vec<String>,
    },
    /// List the configured business's own listings, inactive ones included
    Mine,
    /// Get listing details
    Get {
        #[arg(help = "Listing ID")]
        id: String,
    },
    /// Create a new listing
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long = "type")]
        listing_type: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        capacity: u32,
        #[arg(long)]
        location: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
    },
    /// Update fields of an owned listing
    Update {
        #[arg(help = "Listing ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete an owned listing
    Delete {
        #[arg(help = "Listing ID")]
        id: String,
    },
    /// Price an intended booking without making it
    Quote {
        #[arg(help = "Listing ID")]
        id: String,
        #[arg(long)]
        attendees: u32,
    },
}

#[derive(Debug, Serialize)]
struct CreateRequest {
    title: String,
    description: String,
    #[serde(rename = "type")]
    listing_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    capacity: u32,
    location: String,
    tags: Vec<String>,
    images: Vec<String>,
    amenities: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    listing_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    min_price: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amenities: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct UpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub listing_type: String,
    #[tabled(display_with = "display_decimal")]
    pub price: Decimal,
    pub currency: String,
    pub capacity: u32,
    pub location: String,
    pub active: bool,
    #[tabled(rename = "business")]
    pub business_id: String,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[tabled(rename = "listing")]
    pub listing_id: String,
    pub attendees: u32,
    #[tabled(display_with = "display_decimal")]
    pub unit_price: Decimal,
    #[tabled(display_with = "display_decimal")]
    pub total_price: Decimal,
    pub currency: String,
}

pub(crate) fn display_decimal(d: &Decimal) -> String {
    d.to_string()
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::List {
            listing_type,
            location,
            min_price,
            max_price,
            capacity,
            amenities,
        } => {
            let query = ListingQuery {
                listing_type,
                location,
                min_price,
                max_price,
                capacity,
                amenities: (!amenities.is_empty()).then(|| amenities.join(",")),
            };
            let listings: Vec<Listing> = client.get_with_query("/listings", &query).await?;
            output::print_items(listings, format);
        }
        Commands::Mine => {
            let listings: Vec<Listing> = client.get("/business/listings").await?;
            output::print_items(listings, format);
        }
        Commands::Get { id } => {
            let listing: Listing = client.get(&format!("/listings/{}", id)).await?;
            output::print_item(listing, format);
        }
        Commands::Create {
            title,
            description,
            listing_type,
            price,
            currency,
            capacity,
            location,
            tags,
            images,
            amenities,
        } => {
            let req = CreateRequest {
                title,
                description,
                listing_type,
                price,
                currency,
                capacity,
                location,
                tags,
                images,
                amenities,
            };
            let listing: Listing = client.post("/listings", &req).await?;
            output::print_created(listing, "Listing", format);
        }
        Commands::Update {
            id,
            title,
            description,
            price,
            capacity,
            location,
            active,
        } => {
            let req = UpdateRequest {
                title,
                description,
                price,
                capacity,
                location,
                active,
            };
            let listing: Listing = client.put(&format!("/listings/{}", id), &req).await?;
            output::print_item(listing, format);
        }
        Commands::Delete { id } => {
            client.delete(&format!("/listings/{}", id)).await?;
            output::print_success("Listing deleted");
        }
        Commands::Quote { id, attendees } => {
            let quote: Quote = client
                .get_with_query(
                    &format!("/listings/{}/quote", id),
                    &[("attendees", attendees)],
                )
                .await?;
            output::print_item(quote, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_are_left_out_of_the_query() {
        assert_eq!(
            serde_urlencoded::to_string(ListingQuery::default()).unwrap(),
            ""
        );

        let query = ListingQuery {
            location: Some("New York & Co".into()),
            min_price: Some(Decimal::from(50)),
            capacity: Some(4),
            amenities: Some("wifi,parking".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_urlencoded::to_string(&query).unwrap(),
            "location=New+York+%26+Co&minPrice=50&capacity=4&amenities=wifi%2Cparking"
        );
    }
}
