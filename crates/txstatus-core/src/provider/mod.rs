//! Blockchain-data provider adapters.
//!
//! Defines the [`StatusProvider`] trait every adapter implements and the two
//! concrete explorers ([`BlockCypher`] and [`BlockchainCom`]). Each adapter
//! owns its URL shape and response schema; nothing provider-specific leaks
//! past [`TxStatus`].

mod blockchain_com;
mod blockcypher;

pub use blockchain_com::{BlockchainCom, PoolFailurePolicy};
pub use blockcypher::BlockCypher;

use async_trait::async_trait;
use bitcoin::{Amount, Txid};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::types::{Network, TxState, TxStatus};

/// One blockchain-data provider, queried once per call.
///
/// Implementations return `Ok(None)` when the provider answered well but has
/// no transaction for the address, and `Err` for transport or schema
/// failures. Retrying is the caller's job.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &'static str;

    async fn query(&self, address: &str, network: Network)
        -> Result<Option<TxStatus>, ProviderError>;
}

/// Decode a provider response body into its private model.
pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Parse {
        provider,
        message: e.to_string(),
    })
}

pub(crate) fn parse_txid(provider: &'static str, hash: &str) -> Result<Txid, ProviderError> {
    hash.parse().map_err(|e| ProviderError::Parse {
        provider,
        message: format!("invalid transaction hash `{hash}`: {e}"),
    })
}

/// State of a mempool entry given the provider's double-spend flag.
pub(crate) fn unconfirmed_state(double_spend: bool) -> TxState {
    if double_spend {
        TxState::DoubleSpent
    } else {
        TxState::Created
    }
}

pub(crate) fn status(tx_id: Txid, sats: u64, confirmations: u64, state: TxState) -> TxStatus {
    TxStatus {
        tx_id,
        amount: Amount::from_sat(sats),
        confirmations,
        state,
    }
}
