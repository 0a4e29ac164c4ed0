use anyhow::Result;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::display_option;
use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// Create a business profile owned by the configured user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Get business details
    Get {
        #[arg(help = "Business ID")]
        id: String,
    },
    /// List the business profiles owned by the configured user
    Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    #[tabled(rename = "owner")]
    pub owner_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[tabled(display_with = "display_option")]
    pub website: Option<String>,
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Create {
            name,
            description,
            contact,
            address,
            website,
        } => {
            let req = CreateRequest {
                name,
                description,
                contact_info: contact,
                address,
                website,
            };
            let business: Business = client.post("/businesses", &req).await?;
            output::print_created(business, "Business", format);
        }
        Commands::Get { id } => {
            let business: Business = client.get(&format!("/businesses/{}", id)).await?;
            output::print_item(business, format);
        }
        Commands::Profile => {
            let businesses: Vec<Business> = client.get("/business/profile").await?;
            output::print_items(businesses, format);
        }
    }

    Ok(())
}
