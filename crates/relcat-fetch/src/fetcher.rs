use std::future::Future;

use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::{FetchError, FetchOptions, HttpClient, RemoteMetadata, Result};

/// Downloads whole resources through an [`HttpClient`].
///
/// Every request is bounded by [`FetchOptions::request_timeout`], body
/// included.
pub struct Fetcher<C> {
    client:  C,
    options: FetchOptions,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, options: FetchOptions) -> Self { Self { client, options } }

    pub fn client(&self) -> &C { &self.client }

    pub fn options(&self) -> &FetchOptions { &self.options }

    /// Retrieves the full body of `url`.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let (_, bytes) = self.download_with_metadata(url).await?;
        Ok(bytes)
    }

    /// Retrieves the full body of `url` along with the caching headers of
    /// the response that carried it.
    pub async fn download_with_metadata(&self, url: &str) -> Result<(RemoteMetadata, Bytes)> {
        let (meta, bytes) = self
            .bounded(url, async {
                let (meta, mut stream) = self
                    .client
                    .stream(url, &self.options.headers)
                    .await
                    .map_err(Into::<FetchError>::into)?;

                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.try_next().await.map_err(Into::<FetchError>::into)? {
                    buffer.extend_from_slice(&chunk);
                }
                Ok::<_, FetchError>((meta, buffer.freeze()))
            })
            .await?;

        debug!(url, bytes = bytes.len(), "downloaded");
        Ok((meta, bytes))
    }

    /// Retrieves `url` and decodes it as UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.download(url).await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::InvalidUtf8 {
            url: url.to_string(),
        })
    }

    pub async fn head(&self, url: &str) -> Result<RemoteMetadata> {
        self.bounded(url, async {
            self.client.head(url).await.map_err(Into::<FetchError>::into)
        })
            .await
    }

    async fn bounded<T>(&self, url: &str, work: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.options.request_timeout, work)
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{MockHttpClient, MockResponse};

    const URL: &str = "https://releases.example.com/index.json";

    #[tokio::test]
    async fn test_download_reassembles_chunks() {
        let client = MockHttpClient::new().route(URL, MockResponse::ok("hello world"));
        let fetcher = Fetcher::new(client, FetchOptions::default());

        let bytes = fetcher.download(URL).await.unwrap();
        assert_eq!(&bytes[..], b"hello world");
        assert_eq!(fetcher.client().count("GET", URL), 1);
    }

    #[tokio::test]
    async fn test_status_is_reported() {
        let client = MockHttpClient::new().route(URL, MockResponse::status(503));
        let fetcher = Fetcher::new(client, FetchOptions::default());

        let err = fetcher.download(URL).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        let err = fetcher.download("https://releases.example.com/missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let client = MockHttpClient::new()
            .route(URL, MockResponse::ok("late"))
            .with_delay(Duration::from_secs(5));
        let options = FetchOptions::default().request_timeout(Duration::from_millis(20));
        let fetcher = Fetcher::new(client, options);

        let err = fetcher.download(URL).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_binary() {
        let client = MockHttpClient::new().route(URL, MockResponse::ok(vec![0xff, 0xfe, 0x00]));
        let fetcher = Fetcher::new(client, FetchOptions::default());

        assert!(matches!(
            fetcher.fetch_text(URL).await,
            Err(FetchError::InvalidUtf8 { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_reports_response_etag() {
        let client =
            MockHttpClient::new().route(URL, MockResponse::ok("{}").with_etag("\"abc123\""));
        let fetcher = Fetcher::new(client, FetchOptions::default());

        let (meta, bytes) = fetcher.download_with_metadata(URL).await.unwrap();
        assert_eq!(meta.etag.as_deref(), Some("\"abc123\""));
        assert_eq!(&bytes[..], b"{}");
        assert_eq!(fetcher.client().count("HEAD", URL), 0);
    }

    #[tokio::test]
    async fn test_head_reports_etag() {
        let client =
            MockHttpClient::new().route(URL, MockResponse::ok("{}").with_etag("\"abc123\""));
        let fetcher = Fetcher::new(client, FetchOptions::default());

        let meta = fetcher.head(URL).await.unwrap();
        assert_eq!(meta.etag.as_deref(), Some("\"abc123\""));
        assert_eq!(meta.content_length, Some(2));
    }
}
