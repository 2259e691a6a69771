use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::fetch::HttpFetch;
use crate::types::{Network, TxStatus};

use super::{parse_json, parse_txid, status, unconfirmed_state, StatusProvider};

const NAME: &str = "blockcypher";
const DEFAULT_BASE_URL: &str = "https://api.blockcypher.com/v1/btc";

// ==============================================================================
// BlockCypher adapter
// ==============================================================================

/// Explorer whose address endpoint returns confirmed and unconfirmed
/// transaction references as two separate lists, newest first.
pub struct BlockCypher {
    fetch: Arc<dyn HttpFetch>,
    base_url: String,
    token: Option<String>,
}

impl BlockCypher {
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self {
            fetch,
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// API token; raises the anonymous request quota.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn address_url(&self, address: &str, network: Network) -> String {
        let chain = match network {
            Network::Main => "main",
            Network::TestNet => "test3",
        };
        let mut url = format!("{}/{chain}/addrs/{address}", self.base_url);
        if let Some(token) = &self.token {
            url.push_str("?token=");
            url.push_str(token);
        }
        url
    }
}

#[async_trait]
impl StatusProvider for BlockCypher {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn query(
        &self,
        address: &str,
        network: Network,
    ) -> Result<Option<TxStatus>, ProviderError> {
        let url = self.address_url(address, network);
        // Any fetcher may echo the URL back; keep the token out of errors.
        let body = self
            .fetch
            .get_text(&url)
            .await
            .map_err(ProviderError::redacted)?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let record: AddressRecord = parse_json(NAME, &body)?;
        debug!(
            provider = NAME,
            unconfirmed = record.unconfirmed_txrefs.as_ref().map_or(0, Vec::len),
            confirmed = record.txrefs.as_ref().map_or(0, Vec::len),
            "address record"
        );

        // Pending activity is the freshest signal; fall back to the newest
        // confirmed reference.
        let first = record
            .unconfirmed_txrefs
            .as_deref()
            .and_then(<[TxRef]>::first)
            .or_else(|| record.txrefs.as_deref().and_then(<[TxRef]>::first));

        first.map(normalize).transpose()
    }
}

fn normalize(txref: &TxRef) -> Result<TxStatus, ProviderError> {
    Ok(status(
        parse_txid(NAME, &txref.tx_hash)?,
        txref.value,
        txref.confirmations,
        unconfirmed_state(txref.double_spend),
    ))
}

// ==============================================================================
// Response model
// ==============================================================================

#[derive(Debug, Deserialize)]
struct AddressRecord {
    #[serde(default)]
    txrefs: Option<Vec<TxRef>>,
    #[serde(default)]
    unconfirmed_txrefs: Option<Vec<TxRef>>,
}

#[derive(Debug, Deserialize)]
struct TxRef {
    tx_hash: String,
    value: u64,
    #[serde(default)]
    confirmations: u64,
    #[serde(default)]
    double_spend: bool,
}
