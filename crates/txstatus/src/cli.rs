use clap::{Parser, ValueEnum};

use txstatus_core::provider::PoolFailurePolicy;
use txstatus_core::{Network, RacePolicy};

/// txstatus — status of the latest transaction touching a Bitcoin address,
/// raced across public block explorers.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin address to look up.
    pub address: String,

    /// Network the address belongs to (main or testnet).
    #[arg(long, default_value = "main", env = "TXSTATUS_NETWORK")]
    pub network: Network,

    /// Attempts per provider before giving up on it.
    #[arg(long, default_value = "2")]
    pub max_attempts: u32,

    /// Delay between attempts against the same provider, in milliseconds.
    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Which provider answer wins the race.
    #[arg(long, value_enum, default_value = "first-completed")]
    pub race_policy: RacePolicyArg,

    /// What blockchain.com does when its unconfirmed-pool request fails.
    #[arg(long, value_enum, default_value = "degrade")]
    pub pool_failure: PoolFailureArg,

    /// BlockCypher API token (optional; raises the anonymous rate limit).
    #[arg(long, env = "TXSTATUS_BLOCKCYPHER_TOKEN")]
    pub blockcypher_token: Option<String>,

    /// Maximum outbound HTTP requests per second across all providers.
    #[arg(long)]
    pub requests_per_second: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RacePolicyArg {
    FirstCompleted,
    PreferSuccess,
}

impl From<RacePolicyArg> for RacePolicy {
    fn from(arg: RacePolicyArg) -> Self {
        match arg {
            RacePolicyArg::FirstCompleted => RacePolicy::FirstCompleted,
            RacePolicyArg::PreferSuccess => RacePolicy::PreferSuccess,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PoolFailureArg {
    Degrade,
    FailAttempt,
}

impl From<PoolFailureArg> for PoolFailurePolicy {
    fn from(arg: PoolFailureArg) -> Self {
        match arg {
            PoolFailureArg::Degrade => PoolFailurePolicy::Degrade,
            PoolFailureArg::FailAttempt => PoolFailurePolicy::FailAttempt,
        }
    }
}
