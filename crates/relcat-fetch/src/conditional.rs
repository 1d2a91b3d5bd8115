//! Freshness-token caching.
//!
//! A document is stored under a path derived from its ETag, so a changed
//! ETag is a cache miss by construction and stale entries are never read.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use relcat_fs::{AtomicWriteOptions, Created};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{FetchError, Fetcher, HttpClient, Result};

const MAX_KEY_LEN: usize = 128;

/// A document returned by [`ConditionalFetcher::fetch`].
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub bytes:      Bytes,
    /// ETag the server reported, if any.
    pub etag:       Option<String>,
    /// Where the document is cached; `None` when it could not be cached.
    pub path:       Option<PathBuf>,
    pub from_cache: bool,
}

/// Turns an ETag into a single safe path component.
///
/// Weak prefixes and quotes are dropped. Tokens that are not plain
/// `[A-Za-z0-9._-]` are replaced by the hex SHA-256 of the token.
pub fn cache_key(etag: &str) -> String {
    let trimmed = etag.trim();
    let token = trimmed.strip_prefix("W/").unwrap_or(trimmed).trim_matches('"');

    let plain = !token.is_empty()
        && token.len() <= MAX_KEY_LEN
        && token != "."
        && token != ".."
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if plain {
        token.to_string()
    } else {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

fn has_token(etag: &str) -> bool {
    let trimmed = etag.trim();
    !trimmed
        .strip_prefix("W/")
        .unwrap_or(trimmed)
        .trim_matches('"')
        .is_empty()
}

/// Fetcher that reuses a cached copy while the remote ETag is unchanged.
pub struct ConditionalFetcher<C> {
    fetcher:   Fetcher<C>,
    cache_dir: PathBuf,
    extension: String,
}

impl<C: HttpClient> ConditionalFetcher<C> {
    pub fn new(fetcher: Fetcher<C>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            cache_dir: cache_dir.into(),
            extension: "index".to_string(),
        }
    }

    /// File extension of cache entries. Defaults to `index`.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn fetcher(&self) -> &Fetcher<C> { &self.fetcher }

    pub fn cache_dir(&self) -> &Path { &self.cache_dir }

    /// `<cache_dir>/<key>/<key>.<extension>`
    pub fn cache_path(&self, etag: &str) -> PathBuf {
        let key = cache_key(etag);
        self.cache_dir
            .join(&key)
            .join(format!("{key}.{}", self.extension))
    }

    /// Returns the document at `url`, from cache when the ETag of the
    /// response is already known.
    ///
    /// The cache key always comes from the response that carried the body,
    /// so a document is never stored under another response's validator.
    /// Without an ETag the document is used as downloaded and not cached.
    /// Cache entries are created with create-if-absent semantics, so
    /// concurrent callers never overwrite each other.
    pub async fn fetch(&self, url: &str) -> Result<CachedDocument> {
        let (meta, bytes) = self.fetcher.download_with_metadata(url).await?;

        let Some(etag) = meta.etag.filter(|e| has_token(e)) else {
            warn!(url, "no ETag in response, fetching without cache");
            return Ok(CachedDocument {
                bytes,
                etag: None,
                path: None,
                from_cache: false,
            });
        };

        let path = self.cache_path(&etag);
        if let Some(cached) = blocking({
            let path = path.clone();
            move || relcat_fs::read_if_exists(path)
        })
        .await?
        {
            debug!(url, %etag, path = %path.display(), "cache hit");
            return Ok(CachedDocument {
                bytes:      Bytes::from(cached),
                etag:       Some(etag),
                path:       Some(path),
                from_cache: true,
            });
        }

        let created = blocking({
            let path = path.clone();
            let bytes = bytes.clone();
            move || relcat_fs::create_new(path, &bytes, AtomicWriteOptions::new())
        })
        .await?;

        match created {
            Created::Written => debug!(url, %etag, path = %path.display(), "cached"),
            Created::Existing => debug!(url, %etag, "cache entry written by another caller"),
        }

        Ok(CachedDocument {
            bytes,
            etag: Some(etag),
            path: Some(path),
            from_cache: false,
        })
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> relcat_fs::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FetchError::Client(format!("cache task failed: {e}")))?
        .map_err(FetchError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxStream, FetchOptions, MockHttpClient, MockResponse, RemoteMetadata};

    const URL: &str = "https://releases.example.com/index.json";

    fn conditional(client: MockHttpClient, dir: &Path) -> ConditionalFetcher<MockHttpClient> {
        ConditionalFetcher::new(Fetcher::new(client, FetchOptions::default()), dir)
    }

    #[test]
    fn test_cache_key_plain_tokens() {
        assert_eq!(cache_key("\"5c1f0e8a\""), "5c1f0e8a");
        assert_eq!(cache_key("W/\"abc-123\""), "abc-123");
        assert_eq!(cache_key("abc.def_1"), "abc.def_1");
    }

    #[test]
    fn test_cache_key_hashes_unsafe_tokens() {
        for token in ["../../etc/passwd", "a/b", "..", "a b", "\"\""] {
            let key = cache_key(token);
            assert_eq!(key.len(), 64, "{token}");
            assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert_ne!(cache_key("a/b"), cache_key("a/c"));
    }

    #[test]
    fn test_cache_path_layout() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = conditional(MockHttpClient::new(), dir.path());
        assert_eq!(
            fetcher.cache_path("\"v1\""),
            dir.path().join("v1").join("v1.index")
        );
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new().route(URL, MockResponse::ok("{\"a\":1}").with_etag("\"v1\""));
        let fetcher = conditional(client, dir.path());

        let first = fetcher.fetch(URL).await.unwrap();
        assert!(!first.from_cache);
        let second = fetcher.fetch(URL).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(first.bytes, second.bytes);

        let client = fetcher.fetcher().client();
        assert_eq!(client.count("GET", URL), 2);
        assert_eq!(client.count("HEAD", URL), 0);
    }

    #[tokio::test]
    async fn test_origin_without_head_support() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new()
            .route(URL, MockResponse::ok("{}").with_etag("\"v1\""))
            .without_head();
        let fetcher = conditional(client, dir.path());

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(&doc.bytes[..], b"{}");
        assert_eq!(doc.path, Some(dir.path().join("v1").join("v1.index")));
    }

    /// Answers HEAD with a stale validator while GET serves a newer document.
    struct DivergentClient;

    impl HttpClient for DivergentClient {
        type Error = FetchError;

        async fn stream(
            &self,
            _url: &str,
            _headers: &[(String, String)],
        ) -> Result<(RemoteMetadata, BoxStream<'static, Result<Bytes>>)> {
            let meta = RemoteMetadata {
                etag: Some("\"v2\"".to_string()),
                ..RemoteMetadata::default()
            };
            let body = futures_util::stream::iter(vec![Ok(Bytes::from_static(b"v2-document"))]);
            Ok((meta, Box::pin(body)))
        }

        async fn head(&self, _url: &str) -> Result<RemoteMetadata> {
            Ok(RemoteMetadata {
                etag: Some("\"v1\"".to_string()),
                ..RemoteMetadata::default()
            })
        }
    }

    #[tokio::test]
    async fn test_body_is_keyed_by_its_own_etag() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ConditionalFetcher::new(
            Fetcher::new(DivergentClient, FetchOptions::default()),
            dir.path(),
        );

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(doc.etag.as_deref(), Some("\"v2\""));
        assert!(!dir.path().join("v1").exists());
        assert_eq!(
            std::fs::read(dir.path().join("v2").join("v2.index")).unwrap(),
            b"v2-document"
        );
    }

    #[tokio::test]
    async fn test_changed_etag_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new().route(URL, MockResponse::ok("old").with_etag("\"v1\""));
        let fetcher = conditional(client, dir.path());

        assert_eq!(&fetcher.fetch(URL).await.unwrap().bytes[..], b"old");

        fetcher
            .fetcher()
            .client()
            .set(URL, MockResponse::ok("new").with_etag("\"v2\""));
        let doc = fetcher.fetch(URL).await.unwrap();
        assert!(!doc.from_cache);
        assert_eq!(&doc.bytes[..], b"new");
        assert!(dir.path().join("v1").join("v1.index").exists());
        assert!(dir.path().join("v2").join("v2.index").exists());
    }

    #[tokio::test]
    async fn test_missing_etag_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new().route(URL, MockResponse::ok("body"));
        let fetcher = conditional(client, dir.path());

        let doc = fetcher.fetch(URL).await.unwrap();
        assert!(doc.path.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_source_leaves_cache_alone() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = conditional(MockHttpClient::new(), dir.path());

        assert!(fetcher.fetch(URL).await.unwrap_err().is_not_found());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
