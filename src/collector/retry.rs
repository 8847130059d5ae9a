//! Fixed-delay retry policy for transient source faults.
//!
//! Retry is deliberately decoupled from pagination: the policy wraps a
//! single fetch-one-page operation, so the page walk never needs to know
//! how many attempts a page took.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::source::SourceError;

/// When and how often to retry a failed page request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Fixed wait between attempts.
    pub delay: Duration,
    /// Maximum attempts per page, `None` for unbounded.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    /// Matches the source's published rate-limit window: wait 15 minutes
    /// and retry until the limit clears.
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(15 * 60),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with a bounded number of attempts.
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Failure of an operation after the policy was applied.
#[derive(Debug, Error)]
pub enum RetryError {
    /// A bounded policy ran out of attempts on transient faults.
    #[error("giving up after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: SourceError },

    /// The operation failed with a non-transient error.
    #[error(transparent)]
    Permanent(SourceError),
}

/// Run `op` until it succeeds, retrying transient errors per `policy`.
///
/// Permanent errors are surfaced immediately. The wait holds no locks or
/// other exclusive resources; it is a plain sleep.
pub async fn with_retries<T, Op, Fut>(policy: &RetryPolicy, mut op: Op) -> Result<T, RetryError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                if let Some(max) = policy.max_attempts {
                    if attempts >= max {
                        return Err(RetryError::Exhausted {
                            attempts,
                            source: err,
                        });
                    }
                }
                warn!(
                    "Transient source error: {}. Retrying in {:?} (attempt {})",
                    err, policy.delay, attempts
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(RetryError::Permanent(err)),
        }
    }
}
