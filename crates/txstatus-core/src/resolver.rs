//! Concurrent multi-provider status resolution.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::error::{ProviderFailure, StatusError};
use crate::fetch::HttpFetch;
use crate::provider::{BlockCypher, BlockchainCom, StatusProvider};
use crate::retry::{fetch_with_retry, FetchOutcome};
use crate::types::{TxStatus, TxStatusQuery};

/// How the resolver picks a winner among providers that did not fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RacePolicy {
    /// The first provider to settle with a status or a "not found" wins, so a
    /// fast "not found" can beat a slower match.
    #[default]
    FirstCompleted,
    /// Any status beats any "not found"; "not found" is returned only once
    /// every provider has settled without a status.
    PreferSuccess,
}

// ==============================================================================
// Status Resolver
// ==============================================================================

/// Races every registered provider, each wrapped in its own retry loop, and
/// returns one normalized answer.
///
/// All providers start together. When a winner is chosen the remaining
/// provider futures are dropped, cancelling any request or retry sleep they
/// still have in flight.
pub struct StatusResolver {
    providers: Vec<Arc<dyn StatusProvider>>,
    policy: RacePolicy,
}

impl StatusResolver {
    pub fn new(providers: Vec<Arc<dyn StatusProvider>>) -> Self {
        Self {
            providers,
            policy: RacePolicy::default(),
        }
    }

    /// Resolver over both built-in explorers with their default settings.
    pub fn with_default_providers(fetch: Arc<dyn HttpFetch>) -> Self {
        let providers: Vec<Arc<dyn StatusProvider>> = vec![
            Arc::new(BlockCypher::new(Arc::clone(&fetch))),
            Arc::new(BlockchainCom::new(fetch)),
        ];
        Self::new(providers)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    /// Resolve the status of the first qualifying transaction for the
    /// query's address.
    ///
    /// Returns `Ok(None)` when providers answered but none knows a
    /// transaction for the address, and
    /// [`StatusError::ResolutionFailed`] when every provider used up its
    /// attempts without a usable answer.
    pub async fn resolve(&self, query: &TxStatusQuery) -> Result<Option<TxStatus>, StatusError> {
        if self.providers.is_empty() {
            return Err(StatusError::InvalidConfig(
                "no status providers registered".to_owned(),
            ));
        }
        debug!(
            address = query.address(),
            network = %query.network(),
            providers = self.providers.len(),
            max_attempts = query.retry_policy().max_attempts(),
            "resolving transaction status"
        );

        let mut pending: FuturesUnordered<_> = self
            .providers
            .iter()
            .map(|provider| async move {
                let outcome = fetch_with_retry(provider.as_ref(), query).await;
                (provider.name(), outcome)
            })
            .collect();

        let mut failures = Vec::new();
        let mut not_found_from = None;

        while let Some((provider, outcome)) = pending.next().await {
            match outcome {
                FetchOutcome::Found(status) => {
                    info!(
                        provider,
                        txid = %status.tx_id,
                        state = %status.state,
                        confirmations = status.confirmations,
                        "transaction status resolved"
                    );
                    return Ok(Some(status));
                }
                FetchOutcome::NotFound => match self.policy {
                    RacePolicy::FirstCompleted => {
                        info!(provider, "no transaction found for address");
                        return Ok(None);
                    }
                    RacePolicy::PreferSuccess => {
                        debug!(provider, "provider found nothing; waiting for the rest");
                        not_found_from.get_or_insert(provider);
                    }
                },
                FetchOutcome::Exhausted(errors) => {
                    debug!(provider, attempts = errors.len(), "provider exhausted");
                    failures.push(ProviderFailure { provider, errors });
                }
            }
        }

        if let Some(provider) = not_found_from {
            info!(provider, "no transaction found for address");
            return Ok(None);
        }
        Err(StatusError::ResolutionFailed(failures))
    }
}
