use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::fetch::HttpFetch;
use crate::types::{Network, TxState, TxStatus};

use super::{parse_json, parse_txid, status, unconfirmed_state, StatusProvider};

const NAME: &str = "blockchain.com";
const DEFAULT_MAINNET_URL: &str = "https://blockchain.info";
const DEFAULT_TESTNET_URL: &str = "https://testnet.blockchain.info";

/// What to do when the unconfirmed-pool request fails but the address
/// record came back fine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PoolFailurePolicy {
    /// Report the address-record result as if no pool entry matched.
    #[default]
    Degrade,
    /// Fail the whole attempt so the retry loop tries again.
    FailAttempt,
}

// ==============================================================================
// Blockchain.com adapter
// ==============================================================================

/// Explorer that exposes an address aggregate record and, separately, the
/// provider-wide unconfirmed pool. Pending state is found by scanning that
/// pool for the address.
///
/// Two quirks of the aggregate view are kept as-is: the reported amount is
/// the address's `total_received`, not the transaction's value, and the
/// confirmation count is always 0 because the record does not carry one.
pub struct BlockchainCom {
    fetch: Arc<dyn HttpFetch>,
    mainnet_url: String,
    testnet_url: String,
    pool_failure: PoolFailurePolicy,
}

impl BlockchainCom {
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self {
            fetch,
            mainnet_url: DEFAULT_MAINNET_URL.to_owned(),
            testnet_url: DEFAULT_TESTNET_URL.to_owned(),
            pool_failure: PoolFailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_urls(mut self, mainnet: impl Into<String>, testnet: impl Into<String>) -> Self {
        self.mainnet_url = mainnet.into().trim_end_matches('/').to_owned();
        self.testnet_url = testnet.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_pool_failure(mut self, policy: PoolFailurePolicy) -> Self {
        self.pool_failure = policy;
        self
    }

    fn base_url(&self, network: Network) -> &str {
        match network {
            Network::Main => &self.mainnet_url,
            Network::TestNet => &self.testnet_url,
        }
    }

    async fn fetch_pool(&self, url: &str) -> Result<UnconfirmedPool, ProviderError> {
        let body = self.fetch.get_text(url).await?;
        if body.trim().is_empty() {
            return Ok(UnconfirmedPool::default());
        }
        parse_json(NAME, &body)
    }
}

#[async_trait]
impl StatusProvider for BlockchainCom {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn query(
        &self,
        address: &str,
        network: Network,
    ) -> Result<Option<TxStatus>, ProviderError> {
        let base = self.base_url(network);
        let record_url = format!("{base}/rawaddr/{address}");
        let pool_url = format!("{base}/unconfirmed-transactions?format=json");

        let (record_body, pool) = futures::join!(
            self.fetch.get_text(&record_url),
            self.fetch_pool(&pool_url)
        );

        let record_body = record_body?;
        let pool = match pool {
            Ok(pool) => Some(pool),
            Err(err) => match self.pool_failure {
                PoolFailurePolicy::Degrade => {
                    warn!(provider = NAME, error = %err, "unconfirmed pool unavailable; reporting address record only");
                    None
                }
                PoolFailurePolicy::FailAttempt => return Err(err),
            },
        };

        if record_body.trim().is_empty() {
            return Ok(None);
        }
        let record: AddressRecord = parse_json(NAME, &record_body)?;
        let Some(first) = record.txs.first() else {
            return Ok(None);
        };
        let tx_id = parse_txid(NAME, &first.hash)?;

        let pending = pool
            .as_ref()
            .and_then(|pool| pool.find_for(address))
            .map(|tx| unconfirmed_state(tx.double_spend));
        debug!(provider = NAME, txs = record.txs.len(), in_pool = pending.is_some(), "address record");

        Ok(Some(status(
            tx_id,
            record.total_received,
            0,
            pending.unwrap_or(TxState::Confirmed),
        )))
    }
}

// ==============================================================================
// Response model
// ==============================================================================

#[derive(Debug, Deserialize)]
struct AddressRecord {
    #[serde(default)]
    total_received: u64,
    #[serde(default)]
    txs: Vec<AddressTx>,
}

#[derive(Debug, Deserialize)]
struct AddressTx {
    hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct UnconfirmedPool {
    #[serde(default)]
    txs: Vec<PoolTx>,
}

impl UnconfirmedPool {
    /// First pool entry spending from or paying to `address`.
    fn find_for(&self, address: &str) -> Option<&PoolTx> {
        self.txs.iter().find(|tx| {
            tx.inputs
                .iter()
                .filter_map(|input| input.prev_out.as_ref())
                .chain(tx.out.iter())
                .any(|output| output.addr.as_deref() == Some(address))
        })
    }
}

#[derive(Debug, Deserialize)]
struct PoolTx {
    #[serde(default)]
    double_spend: bool,
    #[serde(default)]
    inputs: Vec<PoolInput>,
    #[serde(default)]
    out: Vec<PoolOutput>,
}

#[derive(Debug, Deserialize)]
struct PoolInput {
    #[serde(default)]
    prev_out: Option<PoolOutput>,
}

#[derive(Debug, Deserialize)]
struct PoolOutput {
    #[serde(default)]
    addr: Option<String>,
}
