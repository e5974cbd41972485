//! Project-level configuration support
//!
//! Loads configuration from `toolrank.toml` or `.toolrankrc.json` in the
//! working directory, or from an explicit `--config` path.
//!
//! # Configuration Format
//!
//! ```toml
//! # toolrank.toml
//!
//! [scoring]
//! policy = "log"  # or "linear"
//! log_weights = { github = 0.6, product_hunt = 0.4 }
//!
//! [scoring.linear_weights]
//! github_stars = 0.3
//! product_hunt_votes = 0.2
//! app_store_rating = 0.2
//! monthly_active_users = 0.3
//!
//! [scoring.calibration]
//! github_stars = { min = 0, max = 10000 }
//!
//! [refresh]
//! github_delay_ms = 1000
//! product_hunt_delay_ms = 2000
//! retries = 3
//!
//! [defaults]
//! top = 5
//! format = "text"
//! ```

use crate::scoring::{Calibration, LinearWeights, LogWeights, ScoringPolicy};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Config file names searched in the working directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["toolrank.toml", ".toolrankrc.json"];

/// Which composite function produces stored scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// GitHub + Product Hunt, log-normalized (default; used by refresh)
    #[default]
    Log,
    /// All four metrics, min-max normalized
    Linear,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(PolicyKind::Log),
            "linear" => Ok(PolicyKind::Linear),
            other => Err(format!("unknown scoring policy '{}' (expected log or linear)", other)),
        }
    }
}

/// Project-level configuration loaded from toolrank.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Metrics refresh job settings
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Scoring policy selection and its parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringConfig {
    /// Policy used when none is given on the command line
    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default)]
    pub log_weights: LogWeights,

    #[serde(default)]
    pub linear_weights: LinearWeights,

    /// Min-max bounds for the linear policy
    #[serde(default)]
    pub calibration: Calibration,
}

impl ScoringConfig {
    /// Build the configured policy
    pub fn policy(&self) -> ScoringPolicy {
        self.policy_for(self.policy)
    }

    /// Build a policy of the given kind using this config's weights
    pub fn policy_for(&self, kind: PolicyKind) -> ScoringPolicy {
        match kind {
            PolicyKind::Log => ScoringPolicy::LogWeighted(self.log_weights),
            PolicyKind::Linear => ScoringPolicy::LinearWeighted {
                weights: self.linear_weights,
                calibration: self.calibration.clone(),
            },
        }
    }
}

/// Pacing and HTTP settings for the refresh job
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Pause after each GitHub request (default: 1000)
    #[serde(default = "default_github_delay_ms")]
    pub github_delay_ms: u64,

    /// Pause after each Product Hunt request (default: 2000)
    #[serde(default = "default_product_hunt_delay_ms")]
    pub product_hunt_delay_ms: u64,

    /// Attempts per request for transient failures (default: 3)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Per-request timeout (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            github_delay_ms: default_github_delay_ms(),
            product_hunt_delay_ms: default_product_hunt_delay_ms(),
            retries: default_retries(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_github_delay_ms() -> u64 {
    1000
}
fn default_product_hunt_delay_ms() -> u64 {
    2000
}
fn default_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("toolrank-collector/{}", env!("CARGO_PKG_VERSION"))
}

impl RefreshConfig {
    pub fn github_delay(&self) -> Duration {
        Duration::from_millis(self.github_delay_ms)
    }

    pub fn product_hunt_delay(&self) -> Duration {
        Duration::from_millis(self.product_hunt_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default number of tools for `top`
    #[serde(default)]
    pub top: Option<usize>,

    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,
}

/// Output formats accepted in `[defaults] format`
pub const OUTPUT_FORMATS: &[&str] = &["text", "json"];

/// Load project configuration from a directory.
///
/// Searches for `toolrank.toml`, then `.toolrankrc.json`, and loads the
/// first one found. Defaults apply only when neither exists; a file that
/// fails to parse or validate is an error.
pub fn load_project_config(dir: &Path) -> anyhow::Result<ProjectConfig> {
    let Some(path) = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
    else {
        debug!("No project config found, using defaults");
        return Ok(ProjectConfig::default());
    };

    let config = load_config_file(&path)
        .with_context(|| format!("Invalid project config {}", path.display()))?;
    debug!("Loaded project config from {}", path.display());
    Ok(config)
}

/// Load configuration from an explicit file; format follows the extension
pub fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext == "json")
        .unwrap_or(false)
        || path.file_name().map(|n| n == ".toolrankrc.json").unwrap_or(false);

    let config: ProjectConfig = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    config.validate()?;
    Ok(config)
}

impl ProjectConfig {
    /// Reject configurations that can never score.
    ///
    /// Broken calibration, non-finite or negative weights and unknown output
    /// formats are fatal; weights that do not sum to 1.0 only warn.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.scoring
            .calibration
            .validate()
            .map_err(|e| anyhow::anyhow!("[scoring.calibration] {}", e))?;
        self.scoring
            .log_weights
            .validate()
            .map_err(|e| anyhow::anyhow!("[scoring.log_weights] {}", e))?;
        self.scoring
            .linear_weights
            .validate()
            .map_err(|e| anyhow::anyhow!("[scoring.linear_weights] {}", e))?;
        if let Some(format) = &self.defaults.format {
            if !OUTPUT_FORMATS.contains(&format.as_str()) {
                anyhow::bail!(
                    "[defaults] format = \"{}\" (expected one of: {})",
                    format,
                    OUTPUT_FORMATS.join(", ")
                );
            }
        }
        if !self.scoring.log_weights.is_valid() {
            warn!("[scoring.log_weights] do not sum to 1.0");
        }
        if !self.scoring.linear_weights.is_valid() {
            warn!("[scoring.linear_weights] do not sum to 1.0; linear scores may exceed 100");
        }
        Ok(())
    }

    /// Default output format, falling back to text
    pub fn default_format(&self) -> &str {
        self.defaults.format.as_deref().unwrap_or("text")
    }

    /// Default `top` count (5, as on the category pages)
    pub fn default_top(&self) -> usize {
        self.defaults.top.unwrap_or(5)
    }
}
