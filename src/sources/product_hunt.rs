//! Product Hunt vote counts via the v2 GraphQL API

use super::{make_agent, MetricSource, SourceError, SourceResult};
use crate::config::PRODUCT_HUNT_TOKEN_ENV;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const GRAPHQL_URL: &str = "https://api.producthunt.com/v2/api/graphql";

const VOTES_QUERY: &str = "query($slug: String!) { post(slug: $slug) { votesCount } }";

static POST_URL: OnceLock<Regex> = OnceLock::new();

fn post_url_pattern() -> &'static Regex {
    POST_URL.get_or_init(|| Regex::new(r"producthunt\.com/posts/([^/?#]+)").unwrap())
}

/// Extract the post slug from `producthunt.com/posts/<slug>`
pub fn parse_product_hunt_url(url: &str) -> Option<String> {
    post_url_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    slug: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<PostData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    post: Option<Post>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    #[serde(default)]
    votes_count: Option<u64>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// Pull the vote count out of a GraphQL response body
fn votes_from_response(slug: &str, resp: GraphQlResponse) -> SourceResult<u64> {
    if let Some(errors) = resp.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(SourceError::ParseError(format!(
            "GraphQL errors for {}: {}",
            slug,
            messages.join("; ")
        )));
    }
    let post = resp
        .data
        .and_then(|d| d.post)
        .ok_or_else(|| SourceError::NotFound(slug.to_string()))?;
    Ok(post.votes_count.unwrap_or(0))
}

/// Reads `votesCount` for a post slug
pub struct ProductHuntSource {
    agent: ureq::Agent,
    token: Option<String>,
    user_agent: String,
}

impl ProductHuntSource {
    pub fn new(token: Option<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
            token,
            user_agent: user_agent.into(),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn fetch_votes(&self, slug: &str) -> SourceResult<u64> {
        let token = self.token.as_deref().ok_or_else(|| SourceError::MissingToken {
            env_var: PRODUCT_HUNT_TOKEN_ENV.to_string(),
        })?;

        debug!("POST {} (slug={})", GRAPHQL_URL, slug);
        let body = GraphQlRequest {
            query: VOTES_QUERY,
            variables: Variables { slug },
        };

        let response = self
            .agent
            .post(GRAPHQL_URL)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("Authorization", &format!("Bearer {}", token))
            .send_json(&body)
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            404 => return Err(SourceError::NotFound(slug.to_string())),
            401 => {
                return Err(SourceError::Unauthorized(
                    "Product Hunt token rejected".to_string(),
                ))
            }
            429 => return Err(SourceError::RateLimited("Product Hunt".to_string())),
            s if s >= 400 => {
                let message = response.into_body().read_to_string().unwrap_or_default();
                return Err(SourceError::ApiError { status, message });
            }
            _ => {}
        }

        let resp: GraphQlResponse = response
            .into_body()
            .read_json()
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        votes_from_response(slug, resp)
    }
}

impl MetricSource for ProductHuntSource {
    fn name(&self) -> &str {
        "Product Hunt"
    }

    fn fetch(&self, url: &str) -> SourceResult<u64> {
        let slug =
            parse_product_hunt_url(url).ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        self.fetch_votes(&slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GraphQlResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_post_url() {
        assert_eq!(
            parse_product_hunt_url("https://www.producthunt.com/posts/notion-ai").as_deref(),
            Some("notion-ai")
        );
        assert_eq!(
            parse_product_hunt_url("https://producthunt.com/posts/cursor?ref=home").as_deref(),
            Some("cursor")
        );
        assert!(parse_product_hunt_url("https://www.producthunt.com/products/cursor").is_none());
    }

    #[test]
    fn test_votes_from_response() {
        let resp = parse(r#"{"data": {"post": {"votesCount": 1234}}}"#);
        assert_eq!(votes_from_response("x", resp).unwrap(), 1234);

        let resp = parse(r#"{"data": {"post": {}}}"#);
        assert_eq!(votes_from_response("x", resp).unwrap(), 0);
    }

    #[test]
    fn test_missing_post_is_not_found() {
        let resp = parse(r#"{"data": {"post": null}}"#);
        assert!(matches!(
            votes_from_response("ghost", resp),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_graphql_errors_are_reported() {
        let resp = parse(r#"{"errors": [{"message": "bad slug"}], "data": null}"#);
        let err = votes_from_response("x", resp).unwrap_err();
        assert!(err.to_string().contains("bad slug"));
    }

    #[test]
    fn test_missing_token_fails_before_request() {
        let source = ProductHuntSource::new(None, "test", Duration::from_secs(1));
        let err = source
            .fetch("https://www.producthunt.com/posts/notion-ai")
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingToken { .. }));
        assert!(!source.has_token());
    }

    #[test]
    fn test_query_uses_variables() {
        let body = GraphQlRequest {
            query: VOTES_QUERY,
            variables: Variables { slug: "a\"b" },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["slug"], "a\"b");
        assert!(!json["query"].as_str().unwrap().contains("a\"b"));
    }
}
