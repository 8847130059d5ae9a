//! Paginated collection of geotagged posts.
//!
//! Walks a search source strictly backward in id order using an exclusive
//! "older than" watermark. The watermark only advances after a page's posts
//! have been appended, so a retried page neither loses nor duplicates
//! records.

mod retry;

pub use retry::{with_retries, RetryError, RetryPolicy};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::models::{Geocode, RawPost};
use crate::source::{PageRequest, PostSource, SourceError};

/// Maximum posts requested per page.
pub const PAGE_CAP: usize = 100;

/// Collection failure. Both variants carry the posts accumulated before the
/// failure so the caller can still persist partial progress.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A bounded retry policy gave up on a transient fault.
    #[error("retries exhausted after {attempts} attempts ({} posts collected): {source}", .partial.len())]
    RetriesExhausted {
        attempts: u32,
        source: SourceError,
        partial: Vec<RawPost>,
    },

    /// The source reported a permanent error.
    #[error("source failed ({} posts collected): {source}", .partial.len())]
    Permanent {
        source: SourceError,
        partial: Vec<RawPost>,
    },
}

impl CollectError {
    /// Posts collected before the failure.
    pub fn partial(&self) -> &[RawPost] {
        match self {
            Self::RetriesExhausted { partial, .. } | Self::Permanent { partial, .. } => partial,
        }
    }

    /// Consume the error, keeping the partial sequence.
    pub fn into_partial(self) -> Vec<RawPost> {
        match self {
            Self::RetriesExhausted { partial, .. } | Self::Permanent { partial, .. } => partial,
        }
    }
}

/// Paginated, rate-limit-aware collector over a [`PostSource`].
pub struct Collector<S> {
    source: S,
    policy: RetryPolicy,
    stop: Option<Arc<AtomicBool>>,
    observer: Option<Box<dyn Fn(usize) + Send + Sync>>,
}

impl<S: PostSource> Collector<S> {
    /// Create a collector with the default retry policy (15-minute fixed
    /// delay, unbounded attempts).
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: RetryPolicy::default(),
            stop: None,
            observer: None,
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Install a stop flag, checked between pages (never mid-page).
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Install a per-page progress observer, called with the running total
    /// after each successful page.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map(|s| s.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Collect up to `target` posts for the region, newest first.
    ///
    /// Terminates when the target is reached, the source returns an empty
    /// page (exhaustion), or the stop flag is raised between pages. Given a
    /// source with consistent id ordering the returned ids are strictly
    /// decreasing and duplicate-free.
    pub async fn collect(
        &self,
        geocode: &Geocode,
        target: usize,
        lang: &str,
    ) -> Result<Vec<RawPost>, CollectError> {
        let mut posts: Vec<RawPost> = Vec::new();
        let mut older_than: Option<u64> = None;

        info!("Starting collection for region {} (target {})", geocode, target);

        while posts.len() < target {
            if self.stop_requested() {
                info!("Stop requested; ending collection at {} posts", posts.len());
                break;
            }

            let req = PageRequest {
                geocode: geocode.clone(),
                lang: lang.to_string(),
                count: PAGE_CAP.min(target - posts.len()),
                older_than,
            };

            let source = &self.source;
            let page = match with_retries(&self.policy, || source.fetch_page(&req)).await {
                Ok(page) => page,
                Err(RetryError::Exhausted { attempts, source }) => {
                    return Err(CollectError::RetriesExhausted {
                        attempts,
                        source,
                        partial: posts,
                    })
                }
                Err(RetryError::Permanent(source)) => {
                    return Err(CollectError::Permanent {
                        source,
                        partial: posts,
                    })
                }
            };

            if page.is_empty() {
                info!("Source exhausted after {} posts", posts.len());
                break;
            }

            // Watermark advances only after the page is appended.
            let oldest = page.iter().map(|p| p.id).min();
            for post in page {
                if posts.len() >= target {
                    break;
                }
                posts.push(post);
            }
            older_than = oldest;

            info!("Fetched {} posts so far", posts.len());
            if let Some(observer) = &self.observer {
                observer(posts.len());
            }
        }

        info!("Collection complete: {} posts", posts.len());
        Ok(posts)
    }
}
