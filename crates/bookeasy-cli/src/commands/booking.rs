use anyhow::Result;
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::listing::display_decimal;
use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// List bookings visible to the configured user
    List,
    /// Book a listing
    Create {
        #[arg(long)]
        listing: String,
        #[arg(long, help = "Name the booking is held under")]
        name: String,
        #[arg(long, help = "Date as YYYY-MM-DD")]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        attendees: u32,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Get booking details
    Get {
        #[arg(help = "Booking ID")]
        id: String,
    },
    /// Change the status of a booking on one of your listings
    Status {
        #[arg(help = "Booking ID")]
        id: String,
        #[arg(value_enum)]
        status: Status,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    listing_id: String,
    customer_name: String,
    date: NaiveDate,
    time: String,
    attendees: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_requests: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusRequest {
    status: Status,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    #[tabled(rename = "listing")]
    pub listing_id: String,
    #[tabled(rename = "customer")]
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub attendees: u32,
    pub status: String,
    #[tabled(rename = "total", display_with = "display_decimal")]
    pub total_paid: Decimal,
    pub currency: String,
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::List => {
            let bookings: Vec<Booking> = client.get("/bookings").await?;
            output::print_items(bookings, format);
        }
        Commands::Create {
            listing,
            name,
            date,
            time,
            attendees,
            contact,
            notes,
        } => {
            let req = CreateRequest {
                listing_id: listing,
                customer_name: name,
                date,
                time,
                attendees,
                contact_info: contact,
                special_requests: notes,
            };
            let booking: Booking = client.post("/bookings", &req).await?;
            output::print_created(booking, "Booking", format);
        }
        Commands::Get { id } => {
            let booking: Booking = client.get(&format!("/bookings/{}", id)).await?;
            output::print_item(booking, format);
        }
        Commands::Status { id, status } => {
            let booking: Booking = client
                .put(&format!("/bookings/{}/status", id), &StatusRequest { status })
                .await?;
            output::print_item(booking, format);
        }
    }

    Ok(())
}
