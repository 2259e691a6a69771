//! HTTP fetch abstraction layer.
//!
//! Defines the [`HttpFetch`] trait provider adapters use to read response
//! bodies and provides a `reqwest` implementation ([`HttpClient`]) plus a
//! test mock (`mock::MockFetch`).

mod client;
#[cfg(test)]
pub mod mock;

pub use client::HttpClient;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Minimal GET-and-read-body capability.
///
/// Non-success HTTP statuses are reported as errors. Implementations never
/// retry; that happens one level up, per provider.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, ProviderError>;
}

/// Query parameters whose values are credentials.
const SECRET_PARAMS: &[&str] = &["token"];

/// `url` with credential query values replaced by `***`, for logs and errors.
///
/// A URL that does not parse keeps only the part before `?`.
pub(crate) fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = reqwest::Url::parse(url) else {
        return url.split_once('?').map_or(url, |(base, _)| base).to_owned();
    };
    if !parsed
        .query_pairs()
        .any(|(key, _)| SECRET_PARAMS.contains(&key.as_ref()))
    {
        return url.to_owned();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| {
            let value = if SECRET_PARAMS.contains(&key.as_ref()) {
                "***".to_owned()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.into()
}
