use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: String,
    pub user_id: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_server() -> String {
    "http://localhost:8080".into()
}

fn default_role() -> String {
    "customer".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            user_id: None,
            role: default_role(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("could not find config directory")?
        .join("bookeasy");
    Ok(dir.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("user_id = \"B1\"").unwrap();

        assert_eq!(config.server, "http://localhost:8080");
        assert_eq!(config.user_id.as_deref(), Some("B1"));
        assert_eq!(config.role, "customer");
    }
}
