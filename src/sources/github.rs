//! GitHub stargazer counts via the REST API

use super::{make_agent, MetricSource, SourceError, SourceResult};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.github.com";

static REPO_URL: OnceLock<Regex> = OnceLock::new();

fn repo_url_pattern() -> &'static Regex {
    REPO_URL.get_or_init(|| Regex::new(r"github\.com/([^/]+)/([^/?#]+)").unwrap())
}

/// Owner and repository name extracted from a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extract `owner/repo` from a GitHub URL, dropping a trailing `.git`
pub fn parse_github_url(url: &str) -> Option<GitHubRepo> {
    let caps = repo_url_pattern().captures(url)?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str().trim_end_matches(".git");
    if repo.is_empty() {
        return None;
    }
    Some(GitHubRepo {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

#[derive(Deserialize)]
struct RepoResponse {
    #[serde(default)]
    stargazers_count: Option<u64>,
}

/// Reads `stargazers_count` from `GET /repos/{owner}/{repo}`
pub struct GitHubSource {
    agent: ureq::Agent,
    token: Option<String>,
    user_agent: String,
    api_base: String,
}

impl GitHubSource {
    pub fn new(token: Option<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
            token,
            user_agent: user_agent.into(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Point the source at a different API host (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn fetch_stars(&self, repo: &GitHubRepo) -> SourceResult<u64> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo);
        debug!("GET {}", url);

        let mut req = self
            .agent
            .get(url.as_str())
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", &self.user_agent);
        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let response = req
            .call()
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            404 => return Err(SourceError::NotFound(repo.to_string())),
            403 | 429 => return Err(SourceError::RateLimited("GitHub".to_string())),
            401 => return Err(SourceError::Unauthorized("GitHub token rejected".to_string())),
            s if s >= 400 => {
                let message = response.into_body().read_to_string().unwrap_or_default();
                return Err(SourceError::ApiError { status, message });
            }
            _ => {}
        }

        let body: RepoResponse = response
            .into_body()
            .read_json()
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(body.stargazers_count.unwrap_or(0))
    }
}

impl MetricSource for GitHubSource {
    fn name(&self) -> &str {
        "GitHub"
    }

    fn fetch(&self, url: &str) -> SourceResult<u64> {
        let repo = parse_github_url(url).ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        self.fetch_stars(&repo)
    }
}
