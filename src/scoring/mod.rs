//! Tool Ranking Scores
//!
//! Pure functions that turn raw popularity signals for a tool into one
//! comparable score, and that order tools by it. Nothing here does I/O or
//! keeps state, so every function is safe to call from any thread.
//!
//! # Normalization
//!
//! ```text
//! logScore(x)            = log10(x + 1) × 10            (unbounded, heavy-tailed counts)
//! normalize(x, min, max) = clamp((x - min)/(max - min), 0, 1)
//! ```
//!
//! # Policies
//!
//! ```text
//! Log-weighted    = clamp(logScore(stars) × 0.6 + logScore(votes) × 0.4, 0, 100)
//! Linear-weighted = round(100 × (N(stars) × 0.3 + N(votes) × 0.2
//!                               + N(rating) × 0.2 + N(mau) × 0.3))
//! ```
//!
//! # Calibration Bounds (linear policy)
//!
//! - GitHub stars: 0 – 10,000
//! - Product Hunt votes: 0 – 1,000
//! - App store rating: 0 – 5
//! - Monthly active users: 0 – 1,000,000
//!
//! # Example
//!
//! A tool with 10,000 stars and no Product Hunt listing:
//!
//! - log-weighted: log10(10001) × 10 × 0.6 ≈ 24.0
//! - linear-weighted: 1.0 × 0.3 × 100 = 30

mod composite;
mod normalize;
mod ranking;

pub use composite::{
    compute_linear_weighted_score, compute_log_weighted_score, LinearWeights, LogWeights,
    ScoringPolicy, MAX_SCORE,
};
pub use normalize::{log_score, log_score_count, normalize, Bounds, Calibration};
pub use ranking::{get_top_n, rank_tools, rank_tools_with, RankedTool, RankingScore};

use thiserror::Error;

/// Errors raised by the scoring functions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Invalid metric {metric}: {value} (must be a finite, non-negative number)")]
    InvalidMetric { metric: String, value: f64 },

    #[error("Invalid weight {weight}: {value} (must be a finite, non-negative number)")]
    InvalidWeight { weight: String, value: f64 },

    #[error("Invalid calibration: max ({max}) must be greater than min ({min})")]
    InvalidCalibration { min: f64, max: f64 },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
