//! Domain types for transaction status resolution.
//!
//! Contains the per-call query (`TxStatusQuery`), the normalized status every
//! provider adapter produces (`TxStatus`, `TxState`), and the `Network`
//! selector used to pick provider URLs.

use std::fmt;
use std::str::FromStr;

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Amount, Txid};
use serde::{Deserialize, Serialize};

use crate::error::StatusError;
use crate::retry::RetryPolicy;

// ==============================================================================
// Network
// ==============================================================================

/// Bitcoin network a query targets. Only changes the URLs each provider
/// adapter builds; resolution logic is identical on both.
/// Parsed from text (`main`, `testnet` and aliases) by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Main,
    TestNet,
}

impl From<Network> for bitcoin::Network {
    fn from(network: Network) -> Self {
        match network {
            Network::Main => bitcoin::Network::Bitcoin,
            Network::TestNet => bitcoin::Network::Testnet,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::TestNet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" | "bitcoin" => Ok(Self::Main),
            "test" | "testnet" | "testnet3" => Ok(Self::TestNet),
            other => Err(StatusError::InvalidConfig(format!(
                "unknown network `{other}`; expected main or testnet"
            ))),
        }
    }
}

// ==============================================================================
// Normalized Status
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    /// Seen by the provider, unconfirmed, not flagged.
    Created,
    /// Flagged by the provider as conflicting with another spend.
    DoubleSpent,
    /// Included in a block.
    Confirmed,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::DoubleSpent => write!(f, "double_spent"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Provider-independent view of the first qualifying transaction for an
/// address. This is the only shape callers of the resolver ever see.
///
/// `Txid` and `Amount` keep the txid well-formed and the amount
/// non-negative without runtime checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    pub tx_id: Txid,
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub amount: Amount,
    pub confirmations: u64,
    pub state: TxState,
}

// ==============================================================================
// Query
// ==============================================================================

/// One status request: which address, on which network, and how hard to try.
#[derive(Debug, Clone)]
pub struct TxStatusQuery {
    address: String,
    network: Network,
    retry: RetryPolicy,
}

impl TxStatusQuery {
    /// Build a query with the default retry policy (2 attempts, 1 s apart).
    ///
    /// The address must parse and belong to `network`; a mismatched or
    /// malformed address would otherwise fail on every provider and every
    /// attempt.
    pub fn new(address: &str, network: Network) -> Result<Self, StatusError> {
        let address = address.trim();
        let unchecked: Address<NetworkUnchecked> =
            address.parse().map_err(|e| StatusError::InvalidAddress {
                address: address.to_owned(),
                message: format!("{e}"),
            })?;
        let checked = unchecked
            .require_network(network.into())
            .map_err(|e| StatusError::InvalidAddress {
                address: address.to_owned(),
                message: format!("{e}"),
            })?;

        Ok(Self {
            address: checked.to_string(),
            network,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}
