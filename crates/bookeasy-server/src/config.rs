use anyhow::{anyhow, Context, Result};
use std::env;

use crate::domain::TransitionPolicy;
use crate::services::CapacityMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub otlp_endpoint: Option<String>,
    pub log_format: LogFormat,
    pub default_currency: String,
    pub capacity_mode: CapacityMode,
    pub status_transitions: TransitionPolicy,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a number")?,
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "json".into())
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "INR".into()),
            capacity_mode: env::var("CAPACITY_MODE")
                .unwrap_or_else(|_| "per_booking".into())
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            status_transitions: env::var("STATUS_TRANSITIONS")
                .unwrap_or_else(|_| "permissive".into())
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a number")?,
        })
    }
}
