use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::FetchError;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response headers relevant to caching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// Raw ETag header, quotes and weak prefix included.
    pub etag:           Option<String>,
    pub last_modified:  Option<String>,
    pub content_length: Option<u64>,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects themselves and must report non-success
/// statuses as errors rather than as bodies.
///
/// # Implementations
///
/// - [`ReqwestClient`](crate::ReqwestClient): production implementation using `reqwest`
/// - [`MockHttpClient`](crate::MockHttpClient): canned responses for tests
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + Into<FetchError> + 'static;

    /// Issues a GET and returns the caching headers of that same response
    /// together with its body as a stream.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<
        Output = std::result::Result<
            (
                RemoteMetadata,
                BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            ),
            Self::Error,
        >,
    > + Send;

    /// Issues a HEAD and returns the caching headers without a body.
    fn head(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<RemoteMetadata, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;
    use reqwest::header::{CONTENT_LENGTH, ETAG, HeaderMap, LAST_MODIFIED};

    use super::*;
    use crate::FetchOptions;

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Builds a client honoring the connect timeout and user agent of
        /// `options`. The request timeout is enforced by [`Fetcher`](crate::Fetcher).
        pub fn new(options: &FetchOptions) -> crate::Result<Self> {
            let client = reqwest::Client::builder()
                .connect_timeout(options.connect_timeout)
                .user_agent(options.user_agent.as_str())
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }
    }

    fn classify(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url:    url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Network {
                url:     url.to_string(),
                message: e.to_string(),
            }
        }
    }

    fn header(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn metadata(headers: &HeaderMap) -> RemoteMetadata {
        RemoteMetadata {
            etag:           header(headers, ETAG),
            last_modified:  header(headers, LAST_MODIFIED),
            content_length: header(headers, CONTENT_LENGTH).and_then(|s| s.parse().ok()),
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = FetchError;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> crate::Result<(RemoteMetadata, BoxStream<'static, crate::Result<Bytes>>)> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| classify(url, e))?;

            let meta = metadata(response.headers());
            let owned = url.to_string();
            let stream = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| classify(&owned, e)));
            Ok((meta, Box::pin(stream)))
        }

        async fn head(&self, url: &str) -> crate::Result<RemoteMetadata> {
            let response = self
                .client
                .head(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| classify(url, e))?;

            Ok(metadata(response.headers()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
