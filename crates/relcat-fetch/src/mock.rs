use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;

use crate::{BoxStream, FetchError, HttpClient, RemoteMetadata, Result};

/// A canned response served by [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body:   Bytes,
    pub etag:   Option<String>,
}

impl MockResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body:   body.into(),
            etag:   None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
            etag: None,
        }
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

/// In-memory [`HttpClient`] keyed by exact URL.
///
/// Unknown URLs answer 404. Every request is recorded as `"GET <url>"` or
/// `"HEAD <url>"` for later assertions.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes:   Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
    delay:    Option<Duration>,
    no_head:  bool,
}

impl MockHttpClient {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn route(self, url: impl Into<String>, response: MockResponse) -> Self {
        self.set(url, response);
        self
    }

    /// Every GET sleeps this long before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every HEAD answers 405, as origins that only serve GET do.
    #[must_use]
    pub fn without_head(mut self) -> Self {
        self.no_head = true;
        self
    }

    /// Replaces the response for `url` on a client that is already shared.
    pub fn set(&self, url: impl Into<String>, response: MockResponse) {
        lock(&self.routes).insert(url.into(), response);
    }

    pub fn requests(&self) -> Vec<String> { lock(&self.requests).clone() }

    pub fn count(&self, method: &str, url: &str) -> usize {
        let needle = format!("{method} {url}");
        lock(&self.requests).iter().filter(|r| **r == needle).count()
    }

    fn respond(&self, method: &str, url: &str) -> Result<MockResponse> {
        lock(&self.requests).push(format!("{method} {url}"));
        let response = lock(&self.routes)
            .get(url)
            .cloned()
            .unwrap_or_else(|| MockResponse::status(404));
        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
            })
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn metadata(response: &MockResponse) -> RemoteMetadata {
    RemoteMetadata {
        etag:           response.etag.clone(),
        last_modified:  None,
        content_length: Some(response.body.len() as u64),
    }
}

impl HttpClient for MockHttpClient {
    type Error = FetchError;

    async fn stream(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<(RemoteMetadata, BoxStream<'static, Result<Bytes>>)> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.respond("GET", url)?;
        let meta = metadata(&response);

        // Two chunks so consumers exercise reassembly.
        let body = response.body;
        let mid = body.len() / 2;
        let chunks = vec![Ok(body.slice(..mid)), Ok(body.slice(mid..))];
        Ok((meta, Box::pin(stream::iter(chunks))))
    }

    async fn head(&self, url: &str) -> Result<RemoteMetadata> {
        if self.no_head {
            lock(&self.requests).push(format!("HEAD {url}"));
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: 405,
            });
        }
        let response = self.respond("HEAD", url)?;
        Ok(metadata(&response))
    }
}
