//! Metric normalization
//!
//! Two ways of putting a raw popularity signal on a comparable scale:
//! log compression for heavy-tailed counts and min-max scaling for metrics
//! with a known ceiling.

use super::{ScoringError, ScoringResult};
use serde::{Deserialize, Serialize};

/// Compress an unbounded count: `log10(x + 1) * 10`.
///
/// 10k stars lands around 40, 100k around 50. Negative or non-finite input
/// is rejected rather than clamped.
pub fn log_score(x: f64) -> ScoringResult<f64> {
    if !x.is_finite() || x < 0.0 {
        return Err(ScoringError::InvalidMetric {
            metric: "count".to_string(),
            value: x,
        });
    }
    Ok((x + 1.0).log10() * 10.0)
}

/// [`log_score`] for integer counts, which cannot be negative
pub fn log_score_count(n: u64) -> f64 {
    (n as f64 + 1.0).log10() * 10.0
}

/// Calibration bounds for linear min-max normalization.
///
/// These are policy values, not physical limits. A value at or above `max`
/// saturates to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Build bounds, failing fast when `max <= min`.
    pub fn new(min: f64, max: f64) -> ScoringResult<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(ScoringError::InvalidCalibration {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Normalize `x` into [0, 1] against these bounds
    pub fn normalize(&self, x: f64) -> ScoringResult<f64> {
        normalize(x, self.min, self.max)
    }
}

/// Linear min-max normalization into [0, 1].
///
/// ```text
/// x <= min  -> 0
/// x >= max  -> 1
/// otherwise -> (x - min) / (max - min)
/// ```
pub fn normalize(x: f64, min: f64, max: f64) -> ScoringResult<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(ScoringError::InvalidCalibration { min, max });
    }
    if x.is_nan() {
        return Err(ScoringError::InvalidMetric {
            metric: "value".to_string(),
            value: x,
        });
    }
    if x <= min {
        return Ok(0.0);
    }
    if x >= max {
        return Ok(1.0);
    }
    Ok((x - min) / (max - min))
}

/// Per-metric calibration used by the linear policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default = "default_github_bounds")]
    pub github_stars: Bounds,
    #[serde(default = "default_product_hunt_bounds")]
    pub product_hunt_votes: Bounds,
    #[serde(default = "default_rating_bounds")]
    pub app_store_rating: Bounds,
    #[serde(default = "default_mau_bounds")]
    pub monthly_active_users: Bounds,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            github_stars: default_github_bounds(),
            product_hunt_votes: default_product_hunt_bounds(),
            app_store_rating: default_rating_bounds(),
            monthly_active_users: default_mau_bounds(),
        }
    }
}

impl Calibration {
    /// Check every bound pair, reporting the first broken one
    pub fn validate(&self) -> ScoringResult<()> {
        self.github_stars.validate()?;
        self.product_hunt_votes.validate()?;
        self.app_store_rating.validate()?;
        self.monthly_active_users.validate()
    }
}

fn default_github_bounds() -> Bounds {
    Bounds { min: 0.0, max: 10_000.0 }
}
fn default_product_hunt_bounds() -> Bounds {
    Bounds { min: 0.0, max: 1_000.0 }
}
fn default_rating_bounds() -> Bounds {
    Bounds { min: 0.0, max: 5.0 }
}
fn default_mau_bounds() -> Bounds {
    Bounds { min: 0.0, max: 1_000_000.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_score_zero() {
        assert_eq!(log_score(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_log_score_reference_points() {
        let ten_k = log_score(10_000.0).unwrap();
        let hundred_k = log_score(100_000.0).unwrap();
        assert!((ten_k - 40.0).abs() < 0.01, "10k stars -> {}", ten_k);
        assert!((hundred_k - 50.0).abs() < 0.01, "100k stars -> {}", hundred_k);
    }

    #[test]
    fn test_log_score_monotonic() {
        let mut prev = 0.0;
        for x in [0.0, 0.5, 1.0, 9.0, 99.0, 1_000.0, 123_456.0, 1e9] {
            let s = log_score(x).unwrap();
            assert!(s >= 0.0);
            assert!(s >= prev, "log_score({}) = {} < {}", x, s, prev);
            prev = s;
        }
    }

    #[test]
    fn test_log_score_rejects_negative() {
        let err = log_score(-1.0).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidMetric { .. }));
        assert!(log_score(f64::NAN).is_err());
    }

    #[test]
    fn test_log_score_count_matches_float() {
        for n in [0u64, 1, 42, 10_000, 9_999_999] {
            assert_eq!(log_score_count(n), log_score(n as f64).unwrap());
        }
    }

    #[test]
    fn test_normalize_endpoints() {
        assert_eq!(normalize(0.0, 0.0, 10.0).unwrap(), 0.0);
        assert_eq!(normalize(10.0, 0.0, 10.0).unwrap(), 1.0);
        assert_eq!(normalize(5.0, 0.0, 10.0).unwrap(), 0.5);
    }

    #[test]
    fn test_normalize_saturates_outside_bounds() {
        assert_eq!(normalize(-50.0, 0.0, 10.0).unwrap(), 0.0);
        assert_eq!(normalize(1e12, 0.0, 10.0).unwrap(), 1.0);
        assert_eq!(normalize(f64::INFINITY, 0.0, 10.0).unwrap(), 1.0);
    }

    #[test]
    fn test_normalize_offset_range() {
        let v = normalize(15.0, 10.0, 20.0).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_rejects_bad_calibration() {
        assert!(matches!(
            normalize(1.0, 5.0, 5.0),
            Err(ScoringError::InvalidCalibration { .. })
        ));
        assert!(matches!(
            normalize(1.0, 10.0, 0.0),
            Err(ScoringError::InvalidCalibration { .. })
        ));
        assert!(Bounds::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_default_calibration_is_valid() {
        let cal = Calibration::default();
        assert!(cal.validate().is_ok());
        assert_eq!(cal.github_stars.max, 10_000.0);
        assert_eq!(cal.product_hunt_votes.max, 1_000.0);
        assert_eq!(cal.app_store_rating.max, 5.0);
        assert_eq!(cal.monthly_active_users.max, 1_000_000.0);
    }

    #[test]
    fn test_calibration_partial_toml() {
        let toml_str = r#"
github_stars = { min = 0.0, max = 50000.0 }
"#;
        let cal: Calibration = toml::from_str(toml_str).unwrap();
        assert_eq!(cal.github_stars.max, 50_000.0);
        assert_eq!(cal.app_store_rating, Bounds { min: 0.0, max: 5.0 });
    }
}
