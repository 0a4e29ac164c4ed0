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
    /// Register a user profile
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "customer")]
        role: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the configured user's profile
    Me,
    /// Get a user profile
    Get {
        #[arg(help = "User ID")]
        id: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    name: String,
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    #[tabled(rename = "phone", display_with = "display_option")]
    pub phone_number: Option<String>,
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Register {
            email,
            name,
            role,
            phone,
        } => {
            let req = RegisterRequest {
                email,
                name,
                role,
                phone_number: phone,
            };
            let user: User = client.post("/users/register", &req).await?;

            match format {
                Format::Json => output::print_json(&user),
                Format::Table => {
                    output::print_success("User registered");
                    println!();
                    println!("To act as this user:");
                    println!("  bookeasy config set --user-id {} --role {}", user.id, user.role);
                    println!();
                    output::print_single(user);
                }
            }
        }
        Commands::Me => {
            let user: User = client.get("/users/me").await?;
            output::print_item(user, format);
        }
        Commands::Get { id } => {
            let user: User = client.get(&format!("/users/{}", id)).await?;
            output::print_item(user, format);
        }
    }

    Ok(())
}
