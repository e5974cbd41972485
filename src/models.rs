//! Core data models for toolrank
//!
//! Raw metrics as they come from collectors, and the JSON catalog that the
//! refresh job and the CLI read and write.

use crate::scoring::{RankingScore, ScoringPolicy, ScoringResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Unprocessed popularity signals for one tool.
///
/// Any signal the collectors could not find is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawMetrics {
    #[serde(default)]
    pub github_stars: u64,
    #[serde(default)]
    pub product_hunt_votes: u64,
    /// 0-5, 0 if unavailable
    #[serde(default, alias = "appStoreRatingOutOfFive")]
    pub app_store_rating: f64,
    #[serde(default)]
    pub monthly_active_users: u64,
}

/// Identifier plus metrics: the input row for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub id: String,
    pub metrics: RawMetrics,
}

/// A tool as stored in the catalog file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_hunt_url: Option<String>,
    #[serde(default)]
    pub metrics: RawMetrics,
    /// Last computed score; derived, safe to discard
    #[serde(default)]
    pub ranking_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ToolRecord {
    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn entry(&self) -> ToolEntry {
        ToolEntry {
            id: self.id.clone(),
            metrics: self.metrics,
        }
    }

    /// Whether any collector can refresh this tool
    pub fn has_sources(&self) -> bool {
        self.github_url.is_some() || self.product_hunt_url.is_some()
    }
}

impl RankingScore for ToolRecord {
    fn ranking_score(&self) -> f64 {
        self.ranking_score
    }
}

/// The tool catalog, persisted as pretty JSON
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub tools: Vec<ToolRecord>,
}

impl Catalog {
    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        debug!("Loaded {} tools from {}", catalog.tools.len(), path.display());
        Ok(catalog)
    }

    /// Write the catalog back as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write catalog {}", path.display()))?;
        debug!("Saved {} tools to {}", self.tools.len(), path.display());
        Ok(())
    }

    pub fn entries(&self) -> Vec<ToolEntry> {
        self.tools.iter().map(ToolRecord::entry).collect()
    }

    pub fn find(&self, id: &str) -> Option<&ToolRecord> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Recompute every stored score with `policy`, overwriting the old value.
    ///
    /// All or nothing: if any tool fails to score, no score is changed.
    pub fn rescore(&mut self, policy: &ScoringPolicy) -> ScoringResult<()> {
        let scores = self
            .tools
            .iter()
            .map(|tool| policy.score(&tool.metrics))
            .collect::<ScoringResult<Vec<_>>>()?;
        for (tool, score) in self.tools.iter_mut().zip(scores) {
            tool.ranking_score = score;
        }
        Ok(())
    }
}
