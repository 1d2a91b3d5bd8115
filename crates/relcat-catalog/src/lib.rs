//! Release catalog: products, their versions in semantic order, and the
//! platform builds of each version.
//!
//! A [`Catalog`] is filled once, either from the vendor's index document
//! ([`IndexDocumentFetcher`]) or by crawling its directory listings
//! ([`LinkCrawler`]), and is read-only afterwards.

mod catalog;
mod crawl;
mod error;
mod index;
mod model;
mod resolve;

pub use catalog::{Catalog, normalize_name};
pub use crawl::{CrawlOptions, DEFAULT_PARALLELISM, DEFAULT_QUEUE_CAPACITY, LinkCrawler, extract_links};
pub use error::{IngestionError, LookupError, Result};
pub use index::{IndexDocumentFetcher, IndexOptions, decode_index};
pub use model::{Build, Product, Version};
pub use resolve::{BuildResolver, resolve_local_build};
