//! HTTP retrieval for release metadata and artifacts.
//!
//! # Architecture
//!
//! - [`HttpClient`] is the I/O seam; [`ReqwestClient`] is the production
//!   implementation and [`MockHttpClient`] serves canned responses in tests
//! - [`Fetcher`] applies [`FetchOptions`] (timeouts, headers) on top of a client
//! - [`ConditionalFetcher`] reuses a cached document while its validator
//!   token is unchanged
//! - [`HttpManifestSource`] locates checksum manifests for verification

mod conditional;
mod error;
mod fetcher;
mod http;
mod manifest;
mod mock;
mod options;

pub use conditional::{CachedDocument, ConditionalFetcher, cache_key};
pub use error::{FetchError, Result};
pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, RemoteMetadata};
pub use manifest::{HttpManifestSource, manifest_url};
pub use mock::{MockHttpClient, MockResponse};
pub use options::FetchOptions;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
