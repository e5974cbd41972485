//! Init command - write an example toolrank.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# toolrank configuration

[scoring]
# "log": GitHub stars + Product Hunt votes, log-normalized, clamped to 0-100
# "linear": all four metrics, min-max normalized, rounded (not clamped)
policy = "log"

[scoring.log_weights]
github = 0.6
product_hunt = 0.4

[scoring.linear_weights]
github_stars = 0.3
product_hunt_votes = 0.2
app_store_rating = 0.2
monthly_active_users = 0.3

# Values at or above max count as 1.0
[scoring.calibration]
github_stars = { min = 0, max = 10000 }
product_hunt_votes = { min = 0, max = 1000 }
app_store_rating = { min = 0, max = 5 }
monthly_active_users = { min = 0, max = 1000000 }

[refresh]
# Pause after each API call (milliseconds)
github_delay_ms = 1000
product_hunt_delay_ms = 2000
retries = 3
timeout_secs = 10

[defaults]
top = 5
format = "text"
"#;

/// Run the init command
pub fn run(dir: &Path) -> Result<()> {
    let config_path = dir.join("toolrank.toml");
    if config_path.exists() {
        println!(
            "{} Already initialized: {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nNext steps:");
    println!("  {} Rank a catalog", style("toolrank rank catalog.json").cyan());
    println!("  {} Refresh metrics", style("toolrank refresh catalog.json").cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_project_config, PolicyKind};
    use crate::scoring::{Calibration, LinearWeights, LogWeights};

    #[test]
    fn test_example_config_matches_defaults() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.scoring.policy, PolicyKind::Log);
        assert_eq!(config.scoring.log_weights, LogWeights::default());
        assert_eq!(config.scoring.linear_weights, LinearWeights::default());
        assert_eq!(config.scoring.calibration, Calibration::default());
        assert_eq!(config.refresh.product_hunt_delay_ms, 2000);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolrank.toml");
        std::fs::write(&path, "[defaults]\ntop = 9\n").unwrap();
        run(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[defaults]\ntop = 9\n");
    }
}
