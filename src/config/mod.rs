//! Configuration module for toolrank
//!
//! This module handles:
//! - Project-level configuration (toolrank.toml)
//! - Scoring policy, weights and calibration bounds
//! - Refresh job pacing
//! - User-level API tokens

mod project_config;
mod user_config;

pub use project_config::{
    load_config_file, load_project_config, CliDefaults, PolicyKind, ProjectConfig,
    RefreshConfig, ScoringConfig, CONFIG_FILE_NAMES, OUTPUT_FORMATS,
};
pub use user_config::{UserConfig, GITHUB_TOKEN_ENV, PRODUCT_HUNT_TOKEN_ENV};
