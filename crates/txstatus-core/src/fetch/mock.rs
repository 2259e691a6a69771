use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;

use super::HttpFetch;

/// A mock HTTP backend for testing. Serves canned bodies or failures per URL,
/// populated via the builder pattern.
///
/// Each URL holds a queue of responses; the last one is repeated once the
/// queue drains, so a single canned body answers any number of requests.
pub struct MockFetch {
    responses: Mutex<HashMap<String, VecDeque<Result<String, ProviderError>>>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetch {
    pub fn builder() -> MockFetchBuilder {
        MockFetchBuilder {
            responses: HashMap::new(),
        }
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

pub struct MockFetchBuilder {
    responses: HashMap<String, VecDeque<Result<String, ProviderError>>>,
}

impl MockFetchBuilder {
    pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses
            .entry(url.to_owned())
            .or_default()
            .push_back(Ok(body.into()));
        self
    }

    pub fn with_json(self, url: &str, body: serde_json::Value) -> Self {
        self.with_body(url, body.to_string())
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.responses
            .entry(url.to_owned())
            .or_default()
            .push_back(Err(ProviderError::Transport {
                url: url.to_owned(),
                message: "connection reset".to_owned(),
            }));
        self
    }

    pub fn build(self) -> MockFetch {
        MockFetch {
            responses: Mutex::new(self.responses),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpFetch for MockFetch {
    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(url.to_owned());

        let mut responses = self.responses.lock().unwrap();
        let Some(queue) = responses.get_mut(url) else {
            return Err(ProviderError::HttpStatus {
                url: url.to_owned(),
                status: 404,
            });
        };
        if queue.len() > 1 {
            queue.pop_front().expect("queue has more than one entry")
        } else {
            queue.front().cloned().expect("builder never stores empty queues")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_url_is_http_404() {
        let fetch = MockFetch::builder().build();
        let err = fetch.get_text("https://nowhere/").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::HttpStatus {
                url: "https://nowhere/".into(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn queued_responses_drain_then_repeat_last() {
        let fetch = MockFetch::builder()
            .with_failure("https://a/")
            .with_body("https://a/", "ok")
            .build();

        assert!(fetch.get_text("https://a/").await.is_err());
        assert_eq!(fetch.get_text("https://a/").await.unwrap(), "ok");
        assert_eq!(fetch.get_text("https://a/").await.unwrap(), "ok");
        assert_eq!(fetch.request_count("https://a/"), 3);
    }
}
