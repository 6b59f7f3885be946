//! Backoff policy and retry helpers for search requests.
//!
//! Rate limits and network failures are retried under a [`BackoffPolicy`];
//! everything else is returned immediately. [`search_with_retry`] is the
//! fault-tolerant entry point: it never returns an error, only an empty list.

use std::future::Future;
use std::time::Duration;

use revpost_core::{SearchHit, SearchKind};

use crate::error::SearchError;
use crate::provider::SearchProvider;

/// Upper bound for a single backoff sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// How many times to attempt a search and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Base delay before a retry. Retry `n` (1-based) sleeps a random value
    /// in `[base, 2 * base) * (n + 1)`.
    pub retry_delay_ms: u64,
    /// Upper bound of the random pause taken before every request.
    pub pacing_ms: u64,
}

impl BackoffPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, retry_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay_ms,
            pacing_ms: retry_delay_ms / 2,
        }
    }

    /// A policy with no sleeps at all.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay_ms: 0,
            pacing_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn retry_delay(&self, retry: u32) -> Duration {
        if self.retry_delay_ms == 0 {
            return Duration::ZERO;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (self.retry_delay_ms as f64 * (1.0 + rand::random::<f64>())) as u64;
        let delay_ms = jittered
            .saturating_mul(u64::from(retry) + 1)
            .min(MAX_DELAY_MS);
        Duration::from_millis(delay_ms)
    }

    /// Delay before retry number `retry` after `err`.
    ///
    /// A rate limit's `Retry-After` is a floor on the backoff, capped at
    /// 60s. A policy without a retry delay never sleeps.
    #[must_use]
    pub fn delay_after(&self, retry: u32, err: &SearchError) -> Duration {
        let backoff = self.retry_delay(retry);
        if self.retry_delay_ms == 0 {
            return backoff;
        }
        match err {
            SearchError::RateLimited { retry_after_secs } => {
                let floor = Duration::from_secs(*retry_after_secs)
                    .min(Duration::from_millis(MAX_DELAY_MS));
                backoff.max(floor)
            }
            _ => backoff,
        }
    }

    /// Random pause in `[pacing / 2, pacing)` taken before each request.
    #[must_use]
    pub fn pacing_delay(&self) -> Duration {
        if self.pacing_ms == 0 {
            return Duration::ZERO;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms = (self.pacing_ms as f64 * (0.5 + rand::random::<f64>() * 0.5)) as u64;
        Duration::from_millis(delay_ms)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3, 2_000)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: rate limiting, timeouts, connection failures, and 5xx statuses.
/// Malformed responses and bad configuration are not.
pub(crate) fn is_retriable(err: &SearchError) -> bool {
    match err {
        SearchError::RateLimited { .. } => true,
        SearchError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SearchError::UnexpectedStatus { status, .. } => *status >= 500,
        SearchError::Deserialize { .. } | SearchError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` up to `policy.max_attempts` times, sleeping between
/// attempts while the error stays retriable.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_attempts {
                    return Err(err);
                }
                let delay = policy.delay_after(attempt, &err);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient search error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Fault-tolerant search: paces the request, retries transient errors, and
/// returns an empty list once the policy gives up.
pub async fn search_with_retry<P: SearchProvider>(
    provider: &P,
    policy: &BackoffPolicy,
    query: &str,
    kind: SearchKind,
    max_results: usize,
) -> Vec<SearchHit> {
    let pacing = policy.pacing_delay();
    if !pacing.is_zero() {
        tokio::time::sleep(pacing).await;
    }

    match retry_with_backoff(policy, || provider.search(query, kind, max_results)).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!(query, kind = %kind, error = %e, "search failed, continuing with no results");
            Vec::new()
        }
    }
}
