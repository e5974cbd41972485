//! `toolrank refresh` command - fetch fresh metrics and rescore

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::config::{PolicyKind, ProjectConfig, UserConfig};
use crate::models::Catalog;
use crate::refresh::{FetchOutcome, RefreshJob, RefreshOptions, RefreshReport};
use crate::sources::{GitHubSource, ProductHuntSource};

fn create_bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("█▓▒░  "))
}

fn outcome_cell(outcome: Option<&FetchOutcome>) -> String {
    match outcome {
        None => style("-").dim().to_string(),
        Some(FetchOutcome {
            success: true,
            count: Some(count),
            ..
        }) => style(format!("✓ {}", count)).green().to_string(),
        Some(_) => style("✗").red().to_string(),
    }
}

fn print_report(report: &RefreshReport) {
    println!();
    for result in &report.results {
        println!(
            "  {:<32} github {:<16} producthunt {:<16} score {:>6.1}",
            result.tool,
            outcome_cell(result.github.as_ref()),
            outcome_cell(result.product_hunt.as_ref()),
            result.ranking_score
        );
        for outcome in [&result.github, &result.product_hunt].into_iter().flatten() {
            if let Some(error) = &outcome.error {
                println!("      {}", style(error).dim());
            }
        }
    }
    println!();
    println!(
        "  Tools: {}  Succeeded: {}  Failed: {}",
        report.total_metrics,
        style(report.success_count).green(),
        style(report.fail_count).red()
    );
}

/// Run the refresh command
pub fn run(
    config: &ProjectConfig,
    catalog_path: &Path,
    policy: Option<PolicyKind>,
    dry_run: bool,
    no_delay: bool,
    format: &str,
) -> Result<()> {
    let mut catalog = Catalog::load(catalog_path)?;
    let user = UserConfig::load()?;

    let refresh = &config.refresh;
    let github = GitHubSource::new(
        user.github_token().map(str::to_string),
        refresh.user_agent.clone(),
        refresh.timeout(),
    );
    let product_hunt = ProductHuntSource::new(
        user.product_hunt_token().map(str::to_string),
        refresh.user_agent.clone(),
        refresh.timeout(),
    );

    if !github.has_token() {
        tracing::warn!("GITHUB_TOKEN not set; GitHub allows 60 unauthenticated requests per hour");
    }
    if !product_hunt.has_token() {
        tracing::warn!("PRODUCTHUNT_API_TOKEN not set; Product Hunt votes will not be refreshed");
    }

    let mut options = RefreshOptions::from_config(refresh);
    if no_delay {
        options = options.no_delay();
    }

    let policy = config
        .scoring
        .policy_for(policy.unwrap_or(config.scoring.policy));
    let job = RefreshJob::new(&github, &product_hunt, policy, options);

    let with_sources = catalog.tools.iter().filter(|t| t.has_sources()).count();
    let show_progress = format != "json";
    let bar = if show_progress {
        let bar = ProgressBar::new(with_sources as u64);
        bar.set_style(create_bar_style()?);
        bar
    } else {
        ProgressBar::hidden()
    };

    let report = job
        .run_with(&mut catalog, |tool| {
            bar.set_message(tool.display_name().to_string());
            bar.inc(1);
        })
        .context("Catalog cannot be scored; nothing was fetched")?;
    bar.finish_and_clear();

    if !dry_run {
        catalog.save(catalog_path)?;
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    if dry_run {
        println!("  {} catalog not written (--dry-run)", style("○").yellow());
    } else {
        println!(
            "  {} Saved {}",
            style("✓").green(),
            style(catalog_path.display()).cyan()
        );
    }
    println!();
    Ok(())
}
