//! `toolrank rank` and `toolrank top` commands

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{PolicyKind, ProjectConfig};
use crate::models::{Catalog, ToolRecord};
use crate::scoring::{get_top_n, rank_tools_with};

fn score_style(score: f64) -> console::StyledObject<String> {
    let text = format!("{:>6.1}", score);
    if score >= 70.0 {
        style(text).green()
    } else if score >= 40.0 {
        style(text).yellow()
    } else {
        style(text).red()
    }
}

fn short_name(name: &str) -> String {
    if name.chars().count() > 38 {
        let head: String = name.chars().take(37).collect();
        format!("{}\u{2026}", head)
    } else {
        name.to_string()
    }
}

/// Run the rank command: score every tool, highest first
pub fn run(
    config: &ProjectConfig,
    catalog_path: &Path,
    policy: Option<PolicyKind>,
    format: &str,
) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let policy = config
        .scoring
        .policy_for(policy.unwrap_or(config.scoring.policy));
    policy.validate()?;

    let ranked = rank_tools_with(&catalog.entries(), &policy)
        .with_context(|| format!("Failed to score {}", catalog_path.display()))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No tools in catalog.");
        return Ok(());
    }

    println!();
    println!("  {:>4}  {:<40} {:>6}", "#", "Tool", "Score");
    println!("  {}", "\u{2500}".repeat(54));
    for (i, row) in ranked.iter().enumerate() {
        let name = catalog
            .find(&row.id)
            .map(ToolRecord::display_name)
            .unwrap_or(&row.id);
        println!(
            "  {:>4}  {:<40} {}",
            i + 1,
            short_name(name),
            score_style(row.score)
        );
    }
    println!();
    println!(
        "  {} tools ranked with the {} policy",
        ranked.len(),
        style(policy.name()).cyan()
    );
    Ok(())
}

/// Run the top command: top N by stored ranking score
pub fn run_top(catalog_path: &Path, n: usize, format: &str) -> Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let top = get_top_n(catalog.tools, n);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&top)?);
        return Ok(());
    }

    if top.is_empty() {
        println!("No tools to show.");
        return Ok(());
    }

    println!();
    for (i, tool) in top.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {}",
            i + 1,
            short_name(tool.display_name()),
            score_style(tool.ranking_score)
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Cursor"), "Cursor");
        let long = "A".repeat(60);
        let short = short_name(&long);
        assert_eq!(short.chars().count(), 38);
        assert!(short.ends_with('\u{2026}'));
    }
}
