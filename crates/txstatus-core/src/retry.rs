//! Bounded retry loop around a single provider.
//!
//! Public data providers are unreliable, so every attempt-level failure is
//! treated as transient: it is logged, recorded, and retried after a fixed
//! delay until the attempt budget runs out.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ProviderError, StatusError};
use crate::provider::StatusProvider;
use crate::types::{TxStatus, TxStatusQuery};

const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

// ==============================================================================
// Retry Policy
// ==============================================================================

/// Attempt budget for one provider within one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Result<Self, StatusError> {
        if max_attempts == 0 {
            return Err(StatusError::InvalidConfig(
                "max attempts must be at least 1".to_owned(),
            ));
        }
        Ok(Self {
            max_attempts,
            retry_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

// ==============================================================================
// Retrying Fetcher
// ==============================================================================

/// Terminal result of running one provider through its attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(TxStatus),
    /// At least one attempt got a well-formed answer with no matching
    /// transaction, and no attempt found one.
    NotFound,
    /// Every attempt failed; errors are in attempt order.
    Exhausted(Vec<ProviderError>),
}

/// Query `provider` until it reports a status or the attempt budget in
/// `query` runs out, sleeping `retry_delay` between attempts (never after
/// the last one).
pub async fn fetch_with_retry(provider: &dyn StatusProvider, query: &TxStatusQuery) -> FetchOutcome {
    let policy = query.retry_policy();
    let mut errors = Vec::new();
    let mut saw_not_found = false;

    for attempt in 1..=policy.max_attempts() {
        match provider.query(query.address(), query.network()).await {
            Ok(Some(status)) => {
                debug!(
                    provider = provider.name(),
                    attempt,
                    txid = %status.tx_id,
                    state = %status.state,
                    "provider returned status"
                );
                return FetchOutcome::Found(status);
            }
            Ok(None) => {
                debug!(provider = provider.name(), attempt, "no transaction for address");
                saw_not_found = true;
            }
            Err(err) => {
                warn!(provider = provider.name(), attempt, error = %err, "attempt failed");
                errors.push(err);
            }
        }

        if attempt < policy.max_attempts() {
            tokio::time::sleep(policy.retry_delay()).await;
        }
    }

    if saw_not_found {
        FetchOutcome::NotFound
    } else {
        FetchOutcome::Exhausted(errors)
    }
}
