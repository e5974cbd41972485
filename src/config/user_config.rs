//! User-level configuration for toolrank
//!
//! Supports loading API tokens from:
//! - Environment variables
//! - ~/.config/toolrank/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const PRODUCT_HUNT_TOKEN_ENV: &str = "PRODUCTHUNT_API_TOKEN";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub tokens: TokenConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TokenConfig {
    /// GitHub token; raises the API rate limit, optional
    pub github_token: Option<String>,

    /// Product Hunt API v2 developer token; required for vote counts
    pub product_hunt_token: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/toolrank/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV) {
            config.tokens.github_token = Some(token);
        }
        if let Ok(token) = std::env::var(PRODUCT_HUNT_TOKEN_ENV) {
            config.tokens.product_hunt_token = Some(token);
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("toolrank").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.tokens.github_token.is_some() {
            self.tokens.github_token = other.tokens.github_token;
        }
        if other.tokens.product_hunt_token.is_some() {
            self.tokens.product_hunt_token = other.tokens.product_hunt_token;
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.tokens.github_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn product_hunt_token(&self) -> Option<&str> {
        self.tokens
            .product_hunt_token
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# toolrank user configuration

[tokens]
# Optional: raises the GitHub API rate limit from 60 to 5000 requests/hour
# github_token = "ghp_..."

# Required for Product Hunt votes: https://www.producthunt.com/v2/oauth/applications
# product_hunt_token = "..."
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}
