use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::listing::display_decimal;
use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Debug, Serialize, Deserialize, Tabled)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub listing_type: String,
    #[tabled(display_with = "display_decimal")]
    pub price: Decimal,
    pub currency: String,
    pub location: String,
    pub image: String,
}

pub async fn run(query: String, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    let results: Vec<SearchResult> = client
        .get_with_query("/search", &[("query", &query)])
        .await?;
    output::print_items(results, format);

    Ok(())
}
