//! Composite scores
//!
//! Two independent policies combine normalized metrics into one number.
//! They are not interchangeable: the log-weighted score is clamped to
//! [0, 100], the linear score is only rounded.

use super::normalize::{log_score_count, Calibration};
use super::{ScoringError, ScoringResult};
use crate::models::RawMetrics;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Upper bound of the clamped log-weighted score
pub const MAX_SCORE: f64 = 100.0;

fn check_weight(weight: &str, value: f64) -> ScoringResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScoringError::InvalidWeight {
            weight: weight.to_string(),
            value,
        })
    }
}

/// Weights for the two-signal log-weighted policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogWeights {
    /// Weight for GitHub stars (default: 0.6)
    #[serde(default = "default_log_github")]
    pub github: f64,

    /// Weight for Product Hunt votes (default: 0.4)
    #[serde(default = "default_log_product_hunt")]
    pub product_hunt: f64,
}

impl Default for LogWeights {
    fn default() -> Self {
        Self {
            github: default_log_github(),
            product_hunt: default_log_product_hunt(),
        }
    }
}

fn default_log_github() -> f64 {
    0.6
}
fn default_log_product_hunt() -> f64 {
    0.4
}

impl LogWeights {
    /// Reject NaN, infinite or negative weights
    pub fn validate(&self) -> ScoringResult<()> {
        check_weight("github", self.github)?;
        check_weight("product_hunt", self.product_hunt)
    }

    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        (self.github + self.product_hunt - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.github + self.product_hunt;
        if sum > 0.0 {
            self.github /= sum;
            self.product_hunt /= sum;
        }
    }
}

/// Weights for the four-signal linear policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearWeights {
    /// default: 0.3
    #[serde(default = "default_linear_github")]
    pub github_stars: f64,
    /// default: 0.2
    #[serde(default = "default_linear_product_hunt")]
    pub product_hunt_votes: f64,
    /// default: 0.2
    #[serde(default = "default_linear_rating")]
    pub app_store_rating: f64,
    /// default: 0.3
    #[serde(default = "default_linear_mau")]
    pub monthly_active_users: f64,
}

impl Default for LinearWeights {
    fn default() -> Self {
        Self {
            github_stars: default_linear_github(),
            product_hunt_votes: default_linear_product_hunt(),
            app_store_rating: default_linear_rating(),
            monthly_active_users: default_linear_mau(),
        }
    }
}

fn default_linear_github() -> f64 {
    0.3
}
fn default_linear_product_hunt() -> f64 {
    0.2
}
fn default_linear_rating() -> f64 {
    0.2
}
fn default_linear_mau() -> f64 {
    0.3
}

impl LinearWeights {
    fn sum(&self) -> f64 {
        self.github_stars + self.product_hunt_votes + self.app_store_rating + self.monthly_active_users
    }

    /// Reject NaN, infinite or negative weights
    pub fn validate(&self) -> ScoringResult<()> {
        check_weight("github_stars", self.github_stars)?;
        check_weight("product_hunt_votes", self.product_hunt_votes)?;
        check_weight("app_store_rating", self.app_store_rating)?;
        check_weight("monthly_active_users", self.monthly_active_users)
    }

    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.github_stars /= sum;
            self.product_hunt_votes /= sum;
            self.app_store_rating /= sum;
            self.monthly_active_users /= sum;
        }
    }
}

/// Two-signal score from GitHub stars and Product Hunt votes.
///
/// ```text
/// score = logScore(stars) * w_github + logScore(votes) * w_product_hunt
/// ```
///
/// The weighted sum is unbounded, so the result is clamped to [0, 100].
/// Clamping is the defined behavior for huge inputs, not an error.
/// Non-finite or negative weights are rejected.
pub fn compute_log_weighted_score(
    github_stars: u64,
    product_hunt_votes: u64,
    weights: &LogWeights,
) -> ScoringResult<f64> {
    weights.validate()?;
    let score = log_score_count(github_stars) * weights.github
        + log_score_count(product_hunt_votes) * weights.product_hunt;
    Ok(score.clamp(0.0, MAX_SCORE))
}

/// Four-signal score from linearly normalized metrics, `round(sum * 100)`.
///
/// Not clamped: weights summing past 1.0 can push the result above 100.
pub fn compute_linear_weighted_score(
    metrics: &RawMetrics,
    weights: &LinearWeights,
    calibration: &Calibration,
) -> ScoringResult<f64> {
    weights.validate()?;
    let rating = metrics.app_store_rating;
    if !rating.is_finite() || rating < 0.0 {
        return Err(ScoringError::InvalidMetric {
            metric: "appStoreRating".to_string(),
            value: rating,
        });
    }

    let github = calibration.github_stars.normalize(metrics.github_stars as f64)?;
    let product_hunt = calibration
        .product_hunt_votes
        .normalize(metrics.product_hunt_votes as f64)?;
    let rating = calibration.app_store_rating.normalize(rating)?;
    let mau = calibration
        .monthly_active_users
        .normalize(metrics.monthly_active_users as f64)?;

    let score = github * weights.github_stars
        + product_hunt * weights.product_hunt_votes
        + rating * weights.app_store_rating
        + mau * weights.monthly_active_users;

    Ok((score * 100.0).round())
}

/// Which composite function produces a tool's score.
///
/// Both policies exist side by side; the caller picks one explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringPolicy {
    /// GitHub + Product Hunt, log-normalized, clamped to [0, 100]
    LogWeighted(LogWeights),
    /// All four metrics, min-max normalized, rounded, not clamped
    LinearWeighted {
        weights: LinearWeights,
        calibration: Calibration,
    },
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::LogWeighted(LogWeights::default())
    }
}

impl ScoringPolicy {
    /// Linear policy with default weights and calibration
    pub fn linear() -> Self {
        ScoringPolicy::LinearWeighted {
            weights: LinearWeights::default(),
            calibration: Calibration::default(),
        }
    }

    /// Short policy name, as used in config and CLI flags
    pub fn name(&self) -> &'static str {
        match self {
            ScoringPolicy::LogWeighted(_) => "log",
            ScoringPolicy::LinearWeighted { .. } => "linear",
        }
    }

    /// Check weights and calibration.
    ///
    /// Weights must be finite and non-negative; a sum other than 1.0 only
    /// warns.
    pub fn validate(&self) -> ScoringResult<()> {
        match self {
            ScoringPolicy::LogWeighted(weights) => {
                weights.validate()?;
                if !weights.is_valid() {
                    warn!(
                        "Log weights sum to {:.3}, expected 1.0",
                        weights.github + weights.product_hunt
                    );
                }
                Ok(())
            }
            ScoringPolicy::LinearWeighted {
                weights,
                calibration,
            } => {
                weights.validate()?;
                if !weights.is_valid() {
                    warn!(
                        "Linear weights sum to {:.3}, expected 1.0; scores may exceed 100",
                        weights.sum()
                    );
                }
                calibration.validate()
            }
        }
    }

    /// Score one tool's metrics
    pub fn score(&self, metrics: &RawMetrics) -> ScoringResult<f64> {
        match self {
            ScoringPolicy::LogWeighted(weights) => compute_log_weighted_score(
                metrics.github_stars,
                metrics.product_hunt_votes,
                weights,
            ),
            ScoringPolicy::LinearWeighted {
                weights,
                calibration,
            } => compute_linear_weighted_score(metrics, weights, calibration),
        }
    }
}
