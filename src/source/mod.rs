//! Remote post sources.
//!
//! A source answers bounded page requests for geotagged posts, walking
//! backward through source-assigned ids. The HTTP implementation lives in
//! [`http`]; tests script their own sources against the same trait.

pub mod http;

pub use http::HttpPostSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Geocode, RawPost};

/// One bounded page request against a source.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Region filter for the search.
    pub geocode: Geocode,
    /// Language code, e.g. `"en"`.
    pub lang: String,
    /// Maximum number of posts to return for this page.
    pub count: usize,
    /// Exclusive upper id bound: only posts with `id < older_than` may be
    /// returned. `None` on the first page.
    pub older_than: Option<u64>,
}

/// Errors a source can report for a single page request.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source signalled a rate limit (transient).
    #[error("rate limited by source (HTTP {status})")]
    RateLimited { status: u16 },

    /// Transport-level fault: timeout, connect failure, body read (transient).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status outside the rate-limit set (permanent).
    #[error("source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload could not be decoded into posts (permanent).
    #[error("malformed source payload: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether the collector should retry this page with the same watermark.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transport(_))
    }
}

/// A paginated search source for geotagged posts.
///
/// Implementations return at most `req.count` posts per call, newest first,
/// all strictly older than `req.older_than` when it is set. An empty page
/// means the source is exhausted for this filter.
#[async_trait]
pub trait PostSource {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Vec<RawPost>, SourceError>;
}
