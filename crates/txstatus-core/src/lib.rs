pub mod error;
pub mod fetch;
pub mod provider;
pub mod resolver;
pub mod retry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{ProviderError, ProviderFailure, StatusError};
pub use resolver::{RacePolicy, StatusResolver};
pub use retry::RetryPolicy;
pub use types::{Network, TxState, TxStatus, TxStatusQuery};
