use std::fmt::Write as _;

use crate::fetch::redact_url;

/// Failure of a single provider request.
///
/// These never reach the caller directly: the retrying fetcher treats every
/// variant as transient and only reports them, collected, once all attempts
/// against every provider are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("malformed {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Same error with credential query values masked in its URL.
    pub(crate) fn redacted(self) -> Self {
        match self {
            Self::Transport { url, message } => Self::Transport {
                url: redact_url(&url),
                message,
            },
            Self::HttpStatus { url, status } => Self::HttpStatus {
                url: redact_url(&url),
                status,
            },
            parse @ Self::Parse { .. } => parse,
        }
    }
}

/// Every attempt failure recorded for one provider, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub errors: Vec<ProviderError>,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("invalid address `{address}`: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("all providers exhausted their attempts: {}", summarize_failures(.0))]
    ResolutionFailed(Vec<ProviderFailure>),
}

fn summarize_failures(failures: &[ProviderFailure]) -> String {
    let mut out = String::new();
    for (idx, failure) in failures.iter().enumerate() {
        if idx > 0 {
            out.push_str("; ");
        }
        let attempts = failure.errors.len();
        let noun = if attempts == 1 { "attempt" } else { "attempts" };
        let _ = write!(out, "{} ({attempts} {noun}", failure.provider);
        if let Some(last) = failure.errors.last() {
            let _ = write!(out, ", last: {last}");
        }
        out.push(')');
    }
    out
}
