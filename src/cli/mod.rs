//! CLI command definitions and handlers

mod doctor;
mod init;
mod rank;
mod refresh;
mod score;

use crate::config::{load_config_file, load_project_config, PolicyKind, ProjectConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Parse a scoring policy name (log, linear)
fn parse_policy(s: &str) -> Result<PolicyKind, String> {
    s.parse()
}

/// toolrank - popularity scores for AI tool catalogs
#[derive(Parser, Debug)]
#[command(name = "toolrank")]
#[command(
    version,
    about = "Score and rank AI tools from GitHub stars, Product Hunt votes, ratings and MAU",
    after_help = "\
Examples:
  toolrank score --stars 10000 --votes 500          Score one tool (log-weighted)
  toolrank score --stars 10000 --policy linear      Score with the four-signal policy
  toolrank rank catalog.json                        Rank every tool in a catalog
  toolrank top catalog.json -n 10                   Top 10 by stored score
  toolrank refresh catalog.json                     Fetch fresh metrics and rescore"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./toolrank.toml or ./.toolrankrc.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example toolrank.toml in the current directory
    Init,

    /// Score a single tool from raw metrics
    Score {
        /// GitHub stargazer count
        #[arg(long, default_value = "0")]
        stars: u64,

        /// Product Hunt vote count
        #[arg(long, default_value = "0")]
        votes: u64,

        /// App store rating, 0-5
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        rating: f64,

        /// Monthly active users
        #[arg(long, default_value = "0")]
        mau: u64,

        /// Scoring policy: log or linear (default: from config)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<PolicyKind>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score every tool in a catalog and print them highest first
    #[command(after_help = "\
Examples:
  toolrank rank catalog.json                   Text table, configured policy
  toolrank rank catalog.json --policy linear   Four-signal policy
  toolrank rank catalog.json --format json     JSON for scripting")]
    Rank {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Scoring policy: log or linear (default: from config)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<PolicyKind>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Show the top N tools by their stored ranking score
    Top {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Number of tools to show (default: 5)
        #[arg(long, short = 'n')]
        n: Option<usize>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Fetch fresh GitHub stars and Product Hunt votes, then rescore the catalog
    #[command(after_help = "\
Environment:
  GITHUB_TOKEN            Optional, raises the GitHub rate limit
  PRODUCTHUNT_API_TOKEN   Required for Product Hunt votes

Examples:
  toolrank refresh catalog.json                Update catalog in place
  toolrank refresh catalog.json --dry-run      Report only, do not write
  toolrank refresh catalog.json --format json  JSON report")]
    Refresh {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Report changes without writing the catalog
        #[arg(long)]
        dry_run: bool,

        /// Skip the pauses between API calls
        #[arg(long)]
        no_delay: bool,

        /// Scoring policy for the recomputed scores (default: from config)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<PolicyKind>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Manage user configuration (API tokens)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check API tokens and config files
    Doctor,

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize user config file with example settings
    Init,
    /// Show current config and paths
    Show,
}

/// Load the explicit --config file, or search the working directory
fn load_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Cannot read current directory")?;
            load_project_config(&cwd)
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(Path::new(".")),

        Commands::Score {
            stars,
            votes,
            rating,
            mau,
            policy,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            score::run(&config, stars, votes, rating, mau, policy, json)
        }

        Commands::Rank {
            catalog,
            policy,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let format = format.unwrap_or_else(|| config.default_format().to_string());
            rank::run(&config, &catalog, policy, &format)
        }

        Commands::Top { catalog, n, format } => {
            let config = load_config(cli.config.as_deref())?;
            let format = format.unwrap_or_else(|| config.default_format().to_string());
            let n = n.unwrap_or_else(|| config.default_top());
            rank::run_top(&catalog, n, &format)
        }

        Commands::Refresh {
            catalog,
            dry_run,
            no_delay,
            policy,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let format = format.unwrap_or_else(|| config.default_format().to_string());
            refresh::run(&config, &catalog, policy, dry_run, no_delay, &format)
        }

        Commands::Config { action } => run_config_action(action),

        Commands::Doctor => doctor::run(cli.config.as_deref()),

        Commands::Version => {
            println!("toolrank {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_config_action(action: ConfigAction) -> Result<()> {
    use crate::config::{UserConfig, GITHUB_TOKEN_ENV, PRODUCT_HUNT_TOKEN_ENV};
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("✅ Config initialized at: {}", path.display());
            println!("\nEdit to add your API tokens, or set via environment:");
            println!("  export {}=\"ghp_...\"", GITHUB_TOKEN_ENV);
            println!("  export {}=\"...\"", PRODUCT_HUNT_TOKEN_ENV);
            Ok(())
        }
        ConfigAction::Show => {
            let config = UserConfig::load()?;
            println!("📁 Config paths:");
            if let Some(user_path) = UserConfig::user_config_path() {
                let status = if user_path.exists() { "✓" } else { "(not found)" };
                println!("  User:    {} {}", user_path.display(), status);
            }
            let proj_status = if Path::new("toolrank.toml").exists() {
                "✓"
            } else {
                "(not found)"
            };
            println!("  Project: ./toolrank.toml {}", proj_status);
            println!();
            println!("🔑 Tokens:");
            println!("  {}: {}", GITHUB_TOKEN_ENV, token_status(config.github_token()));
            println!(
                "  {}: {}",
                PRODUCT_HUNT_TOKEN_ENV,
                token_status(config.product_hunt_token())
            );
            Ok(())
        }
    }
}

fn token_status(token: Option<&str>) -> &'static str {
    if token.is_some() {
        "✓ configured"
    } else {
        "✗ not set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::try_parse_from([
            "toolrank", "score", "--stars", "10000", "--votes", "5", "--policy", "linear",
        ])
        .unwrap();
        match cli.command {
            Commands::Score {
                stars,
                votes,
                policy,
                ..
            } => {
                assert_eq!(stars, 10_000);
                assert_eq!(votes, 5);
                assert_eq!(policy, Some(PolicyKind::Linear));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = Cli::try_parse_from(["toolrank", "score", "--policy", "cubic"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_stars_are_rejected() {
        let result = Cli::try_parse_from(["toolrank", "score", "--stars", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "toolrank", "top", "c.json", "-n", "3", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Top { n: Some(3), .. }));
    }

    #[test]
    fn test_load_config_explicit_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
