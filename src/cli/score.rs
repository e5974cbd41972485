//! `toolrank score` command - score a single tool

use anyhow::Result;
use console::style;
use serde_json::json;

use crate::config::{PolicyKind, ProjectConfig};
use crate::models::RawMetrics;

/// Run the score command
pub fn run(
    config: &ProjectConfig,
    stars: u64,
    votes: u64,
    rating: f64,
    mau: u64,
    policy: Option<PolicyKind>,
    json: bool,
) -> Result<()> {
    let policy = config
        .scoring
        .policy_for(policy.unwrap_or(config.scoring.policy));
    policy.validate()?;

    let metrics = RawMetrics {
        github_stars: stars,
        product_hunt_votes: votes,
        app_store_rating: rating,
        monthly_active_users: mau,
    };
    let score = policy.score(&metrics)?;

    if json {
        let out = json!({
            "policy": policy.name(),
            "metrics": metrics,
            "score": score,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  Policy:  {}", style(policy.name()).cyan());
    println!(
        "  Metrics: {} stars, {} votes, {:.1}/5 rating, {} MAU",
        stars, votes, rating, mau
    );
    println!("  Score:   {}", style(format!("{:.1}", score)).bold());
    println!();
    Ok(())
}
