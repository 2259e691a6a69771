//! Shared test helpers for `txstatus-core` unit tests.
//!
//! Valid addresses, deterministic txids, and a scripted [`StatusProvider`]
//! whose answers and latency are fixed up front, so retry and race tests
//! share one source of truth for stub behaviour.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, PubkeyHash, Txid};

use crate::error::ProviderError;
use crate::provider::StatusProvider;
use crate::retry::RetryPolicy;
use crate::types::{Network, TxState, TxStatus, TxStatusQuery};

// ==============================================================================
// Addresses and Txids
// ==============================================================================

/// The genesis coinbase address; always valid on mainnet.
pub fn mainnet_address() -> &'static str {
    "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
}

/// A P2PKH testnet address derived from a fixed hash.
pub fn testnet_address() -> String {
    Address::p2pkh(PubkeyHash::from_byte_array([7u8; 20]), bitcoin::Network::Testnet).to_string()
}

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

/// Display-order hex of [`txid_from_byte`], as explorers report it.
pub fn txid_hex(b: u8) -> String {
    txid_from_byte(b).to_string()
}

// ==============================================================================
// Status and Query Builders
// ==============================================================================

pub fn make_status(b: u8, sats: u64, confirmations: u64, state: TxState) -> TxStatus {
    TxStatus {
        tx_id: txid_from_byte(b),
        amount: Amount::from_sat(sats),
        confirmations,
        state,
    }
}

pub fn created_status(b: u8) -> TxStatus {
    make_status(b, 1_000, 0, TxState::Created)
}

pub fn confirmed_status(b: u8) -> TxStatus {
    make_status(b, 2_000, 0, TxState::Confirmed)
}

pub fn transport_error() -> ProviderError {
    ProviderError::Transport {
        url: "https://stub.invalid/".to_owned(),
        message: "connection refused".to_owned(),
    }
}

pub fn mainnet_query(max_attempts: u32, retry_delay: Duration) -> TxStatusQuery {
    TxStatusQuery::new(mainnet_address(), Network::Main)
        .expect("genesis address is valid on mainnet")
        .with_retry_policy(RetryPolicy::new(max_attempts, retry_delay).expect("attempts >= 1"))
}

// ==============================================================================
// Scripted Provider
// ==============================================================================

/// One canned answer of a [`ScriptedProvider`].
#[derive(Debug, Clone)]
pub enum Step {
    Found(TxStatus),
    NotFound,
    Fail(ProviderError),
}

/// Provider stub that replays `steps` in order (repeating the last one) and
/// takes `latency` of tokio time per call.
pub struct ScriptedProvider {
    name: &'static str,
    latency: Duration,
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "scripted provider needs at least one step");
        Self {
            name,
            latency: Duration::ZERO,
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(name: &'static str, step: Step) -> Self {
        Self::new(name, vec![step])
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn query(
        &self,
        _address: &str,
        _network: Network,
    ) -> Result<Option<TxStatus>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().expect("more than one step queued")
            } else {
                steps.front().cloned().expect("at least one step queued")
            }
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match step {
            Step::Found(status) => Ok(Some(status)),
            Step::NotFound => Ok(None),
            Step::Fail(err) => Err(err),
        }
    }
}
