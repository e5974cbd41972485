//! Metrics refresh job
//!
//! Walks the catalog, pulls fresh GitHub stars and Product Hunt votes for
//! every tool that lists a URL, then recomputes every stored score.
//! Requests are paced with a fixed pause after each call so a full run stays
//! under the public API rate limits.

use crate::config::RefreshConfig;
use crate::models::{Catalog, ToolRecord};
use crate::scoring::{ScoringPolicy, ScoringResult};
use crate::sources::{fetch_with_retry, MetricSource, SourceError};
use chrono::Utc;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::time::Duration;
use tracing::{info, warn};

/// Pacing for a refresh run
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub github_delay: Duration,
    pub product_hunt_delay: Duration,
    pub retries: u32,
    /// Base wait between retries, multiplied by the attempt number
    pub backoff: Duration,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self::from_config(&RefreshConfig::default())
    }
}

impl RefreshOptions {
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self {
            github_delay: config.github_delay(),
            product_hunt_delay: config.product_hunt_delay(),
            retries: config.retries,
            backoff: Duration::from_secs(1),
        }
    }

    /// No pauses at all (tests, local catalogs)
    pub fn no_delay(mut self) -> Self {
        self.github_delay = Duration::ZERO;
        self.product_hunt_delay = Duration::ZERO;
        self.backoff = Duration::ZERO;
        self
    }
}

/// Outcome of one fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub success: bool,
    pub count: Option<u64>,
    pub error: Option<String>,
}

impl FetchOutcome {
    fn ok(count: u64) -> Self {
        Self {
            success: true,
            count: Some(count),
            error: None,
        }
    }

    fn failed(error: &SourceError) -> Self {
        Self {
            success: false,
            count: None,
            error: Some(error.to_string()),
        }
    }
}

/// Serialize an outcome as `{ <count_key>, success, error }`, or null
fn serialize_outcome<S: Serializer>(
    outcome: &Option<FetchOutcome>,
    count_key: &'static str,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let Some(outcome) = outcome else {
        return serializer.serialize_none();
    };
    let mut map = serializer.serialize_map(None)?;
    if let Some(count) = outcome.count {
        map.serialize_entry(count_key, &count)?;
    }
    map.serialize_entry("success", &outcome.success)?;
    if let Some(error) = &outcome.error {
        map.serialize_entry("error", error)?;
    }
    map.end()
}

fn serialize_github<S: Serializer>(o: &Option<FetchOutcome>, s: S) -> Result<S::Ok, S::Error> {
    serialize_outcome(o, "stars", s)
}

fn serialize_product_hunt<S: Serializer>(
    o: &Option<FetchOutcome>,
    s: S,
) -> Result<S::Ok, S::Error> {
    serialize_outcome(o, "votes", s)
}

/// Per-tool line of the report.
///
/// A source is `None` when the tool has no URL for it or the URL is not
/// recognized; such sources are neither fetched nor counted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRefreshResult {
    pub tool: String,
    #[serde(serialize_with = "serialize_github")]
    pub github: Option<FetchOutcome>,
    #[serde(serialize_with = "serialize_product_hunt")]
    pub product_hunt: Option<FetchOutcome>,
    pub ranking_score: f64,
}

/// Summary of a refresh run
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    /// Tools with at least one source URL
    pub total_metrics: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub results: Vec<ToolRefreshResult>,
}

/// Refreshes raw metrics from the collectors and rescores the catalog
pub struct RefreshJob<'a> {
    github: &'a dyn MetricSource,
    product_hunt: &'a dyn MetricSource,
    policy: ScoringPolicy,
    options: RefreshOptions,
}

impl<'a> RefreshJob<'a> {
    pub fn new(
        github: &'a dyn MetricSource,
        product_hunt: &'a dyn MetricSource,
        policy: ScoringPolicy,
        options: RefreshOptions,
    ) -> Self {
        Self {
            github,
            product_hunt,
            policy,
            options,
        }
    }

    /// Run over the whole catalog. See [`RefreshJob::run_with`].
    pub fn run(&self, catalog: &mut Catalog) -> ScoringResult<RefreshReport> {
        self.run_with(catalog, |_| {})
    }

    /// Run over the whole catalog, calling `on_tool` after each tool with
    /// sources has been fetched.
    ///
    /// A failed fetch leaves the old metric in place. Scores are recomputed
    /// for every tool once all fetches are done, including tools without
    /// sources.
    ///
    /// Every tool is scored once before any request is made, so a catalog
    /// the policy cannot score fails fast and is left untouched.
    pub fn run_with(
        &self,
        catalog: &mut Catalog,
        mut on_tool: impl FnMut(&ToolRecord),
    ) -> ScoringResult<RefreshReport> {
        self.policy.validate()?;
        for tool in &catalog.tools {
            if let Err(e) = self.policy.score(&tool.metrics) {
                warn!("{} cannot be scored: {}", tool.id, e);
                return Err(e);
            }
        }

        let mut report = RefreshReport::default();
        let mut fetched = Vec::new();

        for (index, tool) in catalog.tools.iter_mut().enumerate() {
            if !tool.has_sources() {
                continue;
            }
            report.total_metrics += 1;

            let github = tool.github_url.clone().and_then(|url| {
                let outcome = self.fetch(self.github, &url, self.options.github_delay);
                if let Some(stars) = outcome.as_ref().and_then(|o| o.count) {
                    tool.metrics.github_stars = stars;
                    tool.last_updated = Some(Utc::now());
                }
                outcome
            });

            let product_hunt = tool.product_hunt_url.clone().and_then(|url| {
                let outcome = self.fetch(self.product_hunt, &url, self.options.product_hunt_delay);
                if let Some(votes) = outcome.as_ref().and_then(|o| o.count) {
                    tool.metrics.product_hunt_votes = votes;
                    tool.last_updated = Some(Utc::now());
                }
                outcome
            });

            for outcome in github.iter().chain(product_hunt.iter()) {
                if outcome.success {
                    report.success_count += 1;
                } else {
                    report.fail_count += 1;
                }
            }

            on_tool(tool);
            fetched.push((index, github, product_hunt));
        }

        catalog.rescore(&self.policy)?;

        report.results = fetched
            .into_iter()
            .map(|(index, github, product_hunt)| {
                let tool = &catalog.tools[index];
                ToolRefreshResult {
                    tool: tool.display_name().to_string(),
                    github,
                    product_hunt,
                    ranking_score: tool.ranking_score,
                }
            })
            .collect();

        info!(
            "Refresh complete: {} tools, {} succeeded, {} failed ({} policy)",
            report.total_metrics,
            report.success_count,
            report.fail_count,
            self.policy.name()
        );
        Ok(report)
    }

    /// One fetch plus the pause that follows it. Unrecognized URLs are
    /// skipped: no outcome and no pause.
    fn fetch(
        &self,
        source: &dyn MetricSource,
        url: &str,
        delay: Duration,
    ) -> Option<FetchOutcome> {
        let outcome = match fetch_with_retry(source, url, self.options.retries, self.options.backoff)
        {
            Ok(count) => {
                info!("{}: {} -> {}", source.name(), url, count);
                FetchOutcome::ok(count)
            }
            Err(SourceError::InvalidUrl(_)) => {
                warn!("{}: skipping unrecognized URL {}", source.name(), url);
                return None;
            }
            Err(e) => {
                warn!("{}: {} failed: {}", source.name(), url, e);
                FetchOutcome::failed(&e)
            }
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMetrics;
    use crate::scoring::ScoringError;
    use crate::sources::SourceResult;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory source keyed by URL
    struct FakeSource {
        name: &'static str,
        counts: HashMap<String, u64>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(name: &'static str, counts: &[(&str, u64)]) -> Self {
            Self {
                name,
                counts: counts.iter().map(|(u, c)| (u.to_string(), *c)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl MetricSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch(&self, url: &str) -> SourceResult<u64> {
            self.calls.lock().unwrap().push(url.to_string());
            if !url.starts_with("https://") {
                return Err(SourceError::InvalidUrl(url.to_string()));
            }
            self.counts
                .get(url)
                .copied()
                .ok_or_else(|| SourceError::NotFound(url.to_string()))
        }
    }

    fn tool(id: &str, github: Option<&str>, ph: Option<&str>) -> ToolRecord {
        ToolRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            github_url: github.map(str::to_string),
            product_hunt_url: ph.map(str::to_string),
            ..Default::default()
        }
    }

    fn options() -> RefreshOptions {
        RefreshOptions::default().no_delay()
    }

    #[test]
    fn test_refresh_updates_metrics_and_scores() {
        let github = FakeSource::new("GitHub", &[("https://github.com/a/a", 10_000)]);
        let ph = FakeSource::new("Product Hunt", &[("https://www.producthunt.com/posts/a", 99)]);
        let mut catalog = Catalog {
            tools: vec![tool(
                "a",
                Some("https://github.com/a/a"),
                Some("https://www.producthunt.com/posts/a"),
            )],
        };

        let job = RefreshJob::new(&github, &ph, ScoringPolicy::default(), options());
        let report = job.run(&mut catalog).unwrap();

        assert_eq!(report.total_metrics, 1);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.fail_count, 0);

        let a = &catalog.tools[0];
        assert_eq!(a.metrics.github_stars, 10_000);
        assert_eq!(a.metrics.product_hunt_votes, 99);
        assert!(a.last_updated.is_some());
        let expected = 10_001f64.log10() * 6.0 + 100f64.log10() * 4.0;
        assert!((a.ranking_score - expected).abs() < 1e-9);
        assert_eq!(report.results[0].ranking_score, a.ranking_score);
        assert_eq!(report.results[0].tool, "A");
    }

    #[test]
    fn test_failed_fetch_keeps_old_metric() {
        let github = FakeSource::new("GitHub", &[]);
        let ph = FakeSource::new("Product Hunt", &[]);
        let mut stale = tool("b", Some("https://github.com/b/b"), None);
        stale.metrics = RawMetrics {
            github_stars: 500,
            ..Default::default()
        };
        let mut catalog = Catalog { tools: vec![stale] };

        let job = RefreshJob::new(&github, &ph, ScoringPolicy::default(), options());
        let report = job.run(&mut catalog).unwrap();

        assert_eq!(report.fail_count, 1);
        assert_eq!(catalog.tools[0].metrics.github_stars, 500);
        assert!(catalog.tools[0].last_updated.is_none());
        let github_result = report.results[0].github.as_ref().unwrap();
        assert!(!github_result.success);
        assert!(github_result.error.as_deref().unwrap().contains("Not found"));
        assert!(report.results[0].product_hunt.is_none());
    }

    #[test]
    fn test_tools_without_sources_are_rescored_not_fetched() {
        let github = FakeSource::new("GitHub", &[]);
        let ph = FakeSource::new("Product Hunt", &[]);
        let mut offline = tool("c", None, None);
        offline.metrics.github_stars = 9;
        offline.ranking_score = 77.0;
        let mut catalog = Catalog { tools: vec![offline] };

        let job = RefreshJob::new(&github, &ph, ScoringPolicy::default(), options());
        let report = job.run(&mut catalog).unwrap();

        assert_eq!(report.total_metrics, 0);
        assert!(report.results.is_empty());
        assert_eq!(github.call_count(), 0);
        assert!((catalog.tools[0].ranking_score - 10.0f64.log10() * 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrecognized_url_is_skipped() {
        let github = FakeSource::new("GitHub", &[]);
        let ph = FakeSource::new("Product Hunt", &[("https://www.producthunt.com/posts/d", 7)]);
        let mut catalog = Catalog {
            tools: vec![tool(
                "d",
                Some("github.com/nowhere"),
                Some("https://www.producthunt.com/posts/d"),
            )],
        };

        // Default delays: the skipped URL must not sleep either
        let options = RefreshOptions {
            product_hunt_delay: Duration::ZERO,
            ..RefreshOptions::default()
        };
        let started = std::time::Instant::now();
        let job = RefreshJob::new(&github, &ph, ScoringPolicy::default(), options);
        let report = job.run(&mut catalog).unwrap();
        assert!(started.elapsed() < Duration::from_millis(900));

        assert_eq!(report.total_metrics, 1);
        assert_eq!(report.fail_count, 0);
        assert_eq!(report.success_count, 1);
        assert!(report.results[0].github.is_none());
        assert_eq!(catalog.tools[0].metrics.product_hunt_votes, 7);
    }

    #[test]
    fn test_unscorable_catalog_fails_before_fetching() {
        let github = FakeSource::new("GitHub", &[("https://github.com/e/e", 42)]);
        let ph = FakeSource::new("Product Hunt", &[]);
        let mut broken = tool("broken", None, None);
        broken.metrics.app_store_rating = -1.0;
        broken.ranking_score = 12.0;
        let mut catalog = Catalog {
            tools: vec![tool("e", Some("https://github.com/e/e"), None), broken],
        };

        let job = RefreshJob::new(&github, &ph, ScoringPolicy::linear(), options());
        let err = job.run(&mut catalog).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidMetric { .. }));
        assert_eq!(github.call_count(), 0);
        assert_eq!(catalog.tools[0].metrics.github_stars, 0);
        assert_eq!(catalog.tools[1].ranking_score, 12.0);
    }

    #[test]
    fn test_progress_callback_sees_each_fetched_tool() {
        let github = FakeSource::new("GitHub", &[("https://github.com/x/x", 1)]);
        let ph = FakeSource::new("Product Hunt", &[]);
        let mut catalog = Catalog {
            tools: vec![
                tool("x", Some("https://github.com/x/x"), None),
                tool("y", None, None),
                tool("z", Some("https://github.com/z/z"), None),
            ],
        };

        let job = RefreshJob::new(&github, &ph, ScoringPolicy::linear(), options());
        let mut seen = Vec::new();
        job.run_with(&mut catalog, |t| seen.push(t.id.clone())).unwrap();
        assert_eq!(seen, vec!["x", "z"]);
    }

    #[test]
    fn test_report_json_shape() {
        let github = FakeSource::new("GitHub", &[("https://github.com/a/a", 3)]);
        let ph = FakeSource::new("Product Hunt", &[]);
        let mut catalog = Catalog {
            tools: vec![tool("a", Some("https://github.com/a/a"), None)],
        };
        let job = RefreshJob::new(&github, &ph, ScoringPolicy::default(), options());
        let report = job.run(&mut catalog).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalMetrics"], 1);
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["results"][0]["github"]["stars"], 3);
        assert_eq!(json["results"][0]["github"]["success"], true);
        assert!(json["results"][0]["github"].get("count").is_none());
        assert!(json["results"][0]["productHunt"].is_null());
    }
}
