//! Doctor command - check environment

use anyhow::Result;
use std::path::Path;

use crate::config::{
    load_config_file, UserConfig, CONFIG_FILE_NAMES, GITHUB_TOKEN_ENV, PRODUCT_HUNT_TOKEN_ENV,
};

pub fn run(explicit_config: Option<&Path>) -> Result<()> {
    println!("🩺 toolrank doctor\n");
    let mut problems = 0;

    let config_path = explicit_config.map(Path::to_path_buf).or_else(|| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| Path::new(name).to_path_buf())
            .find(|p| p.exists())
    });
    match config_path {
        Some(path) => match load_config_file(&path) {
            Ok(config) => println!(
                "✓ Project config: {} (policy: {})",
                path.display(),
                config.scoring.policy().name()
            ),
            Err(e) => {
                println!("✗ Project config: {} ({})", path.display(), e);
                problems += 1;
            }
        },
        None => println!("○ Project config: none (using defaults)"),
    }

    let user = UserConfig::load()?;
    if user.github_token().is_some() {
        println!("✓ GitHub: token configured");
    } else {
        println!("○ GitHub: no token (60 requests/hour)");
        println!("  Set {} for higher limits", GITHUB_TOKEN_ENV);
    }
    if user.product_hunt_token().is_some() {
        println!("✓ Product Hunt: token configured");
    } else {
        println!("○ Product Hunt: no token (votes will not refresh)");
        println!("  Set {}", PRODUCT_HUNT_TOKEN_ENV);
    }

    if problems == 0 {
        println!("\n✅ All checks passed!");
        Ok(())
    } else {
        anyhow::bail!("{} problem(s) found", problems)
    }
}
