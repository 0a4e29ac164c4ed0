pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;
pub mod telemetry;

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::api::routes;
use crate::auth::{IdentityResolver, TrustedHeaders};
use crate::config::Config;
use crate::services::{BookingEngine, BusinessDirectory, ListingRegistry, SearchIndex, UserDirectory};
use crate::store::{MemoryStore, PgStore, Store};

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityResolver>,
    pub listings: ListingRegistry,
    pub bookings: BookingEngine,
    pub search: SearchIndex,
    pub users: UserDirectory,
    pub businesses: BusinessDirectory,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, identity: Arc<dyn IdentityResolver>) -> Self {
        let listings = ListingRegistry::new(store.clone(), config.default_currency.clone());
        let bookings = BookingEngine::new(
            store.clone(),
            listings.clone(),
            config.capacity_mode,
            config.status_transitions,
        );

        Self {
            search: SearchIndex::new(listings.clone()),
            users: UserDirectory::new(store.clone()),
            businesses: BusinessDirectory::new(store.clone()),
            listings,
            bookings,
            store,
            identity,
            config,
        }
    }
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                info!("using postgres document store");
                Arc::new(PgStore::connect(url, config.db_max_connections).await?)
            }
            None => {
                info!("DATABASE_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Self {
        Self::with_parts(config, store, Arc::new(TrustedHeaders))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            state: Arc::new(AppState::new(config, store, identity)),
        }
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}
