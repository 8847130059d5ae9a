//! HTTP search source.
//!
//! Talks to a Twitter-v1.1-style search endpoint: GET
//! `{base_url}/search/tweets.json` with `geocode`, `lang`, `count`, and an
//! inclusive `max_id` bound, returning `{"statuses": [...]}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{PageRequest, PostSource, SourceError};
use crate::models::{Coordinates, RawPost};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("geopulse/", env!("CARGO_PKG_VERSION"));

/// Default search API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com/1.1";

/// Search source backed by an HTTP API.
#[derive(Clone)]
pub struct HttpPostSource {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpPostSource {
    /// Create a new HTTP source.
    pub fn new(base_url: &str, bearer_token: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
        }
    }

    /// Build the search URL for a page request.
    fn search_url(&self, req: &PageRequest) -> String {
        let mut params = vec![
            format!("geocode={}", urlencoding::encode(&req.geocode.to_string())),
            format!("lang={}", urlencoding::encode(&req.lang)),
            format!("count={}", req.count),
            "tweet_mode=extended".to_string(),
        ];

        // The wire parameter is an inclusive bound; the watermark is
        // exclusive, so step below it.
        if let Some(older_than) = req.older_than {
            params.push(format!("max_id={}", older_than.saturating_sub(1)));
        }

        format!("{}/search/tweets.json?{}", self.base_url, params.join("&"))
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Vec<RawPost>, SourceError> {
        let url = self.search_url(req);
        debug!("Fetching page: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(SourceError::RateLimited {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        let statuses = payload
            .get("statuses")
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::Malformed("missing 'statuses' array".to_string()))?;

        let mut posts = Vec::with_capacity(statuses.len());
        for status in statuses {
            match parse_status(status) {
                Some(post) => posts.push(post),
                None => warn!("Skipping status without a usable id"),
            }
        }

        Ok(posts)
    }
}

/// Decode one status object into a `RawPost`, tolerating missing optionals.
fn parse_status(status: &Value) -> Option<RawPost> {
    let id = status.get("id").and_then(Value::as_u64)?;

    let text = status
        .get("full_text")
        .or_else(|| status.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let user = status.get("user");
    let author = user
        .and_then(|u| u.get("screen_name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let location = user
        .and_then(|u| u.get("location"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // GeoJSON point: {"coordinates": [lon, lat]}
    let coordinates = status
        .get("coordinates")
        .and_then(|c| c.get("coordinates"))
        .and_then(Value::as_array)
        .and_then(|pair| {
            Some(Coordinates {
                longitude: pair.first()?.as_f64()?,
                latitude: pair.get(1)?.as_f64()?,
            })
        });

    Some(RawPost {
        id,
        created_at: status
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        author,
        text,
        location,
        coordinates,
        retweet_count: status
            .get("retweet_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        favorite_count: status
            .get("favorite_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    })
}

/// Keep error bodies short enough for log lines.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}
