//! Catalog construction from the single index document.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use once_cell::sync::Lazy;
use relcat_fetch::{ConditionalFetcher, Fetcher, HttpClient};
use relcat_resource::Platform;
use relcat_version::SemVer;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::{Build, Catalog, IngestionError, Product, Version, normalize_name};

static DEFAULT_BASE_URL: Lazy<Url> =
    Lazy::new(|| Url::parse("https://releases.hashicorp.com/").unwrap());

const INDEX_PATH: &str = "index.json";

#[derive(Debug, Deserialize)]
struct ProductDoc {
    #[serde(default)]
    name:     String,
    #[serde(default)]
    versions: HashMap<String, VersionDoc>,
}

#[derive(Debug, Deserialize)]
struct VersionDoc {
    version:           String,
    #[serde(default)]
    shasums:           Option<String>,
    #[serde(default)]
    shasums_signature: Option<String>,
    #[serde(default)]
    builds:            Vec<BuildDoc>,
}

#[derive(Debug, Deserialize)]
struct BuildDoc {
    os:       String,
    arch:     String,
    filename: String,
    url:      String,
}

/// Where the index document lives and where it is cached.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub base_url:  Url,
    pub cache_dir: PathBuf,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            base_url:  DEFAULT_BASE_URL.clone(),
            cache_dir: std::env::temp_dir().join("hashi-releases"),
        }
    }
}

impl IndexOptions {
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// `<base>/index.json`
    pub fn index_url(&self) -> Result<Url, IngestionError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(INDEX_PATH)
            .map_err(|e| IngestionError::InvalidUrl(format!("{base}: {e}")))
    }
}

/// Builds a [`Catalog`] from the vendor's index document, reusing a cached
/// copy while the document's ETag is unchanged.
pub struct IndexDocumentFetcher<C> {
    fetcher: ConditionalFetcher<C>,
    options: IndexOptions,
}

impl<C: HttpClient> IndexDocumentFetcher<C> {
    pub fn new(fetcher: Fetcher<C>, options: IndexOptions) -> Self {
        Self {
            fetcher: ConditionalFetcher::new(fetcher, options.cache_dir.clone()),
            options,
        }
    }

    pub fn options(&self) -> &IndexOptions { &self.options }

    pub async fn fetch_index(&self) -> Result<Catalog, IngestionError> {
        let url = self.options.index_url()?;
        let document = self.fetcher.fetch(url.as_str()).await?;
        let catalog = decode_index(&document.bytes, url.as_str())?;

        info!(
            products = catalog.len(),
            from_cache = document.from_cache,
            "index document loaded"
        );
        Ok(catalog)
    }
}

/// Decodes an index document. Versions that do not parse are skipped; a
/// malformed document fails as a whole.
///
/// Document keys that normalize to the same product name are merged into
/// one product.
pub fn decode_index(bytes: &[u8], url: &str) -> Result<Catalog, IngestionError> {
    let document: BTreeMap<String, ProductDoc> =
        serde_json::from_slice(bytes).map_err(|source| IngestionError::Decode {
            url: url.to_string(),
            source,
        })?;

    let mut products: BTreeMap<String, Product> = BTreeMap::new();
    for (key, doc) in document {
        let name = normalize_name(if doc.name.trim().is_empty() { &key } else { &doc.name });
        let product = match products.entry(name.clone()) {
            Entry::Occupied(entry) => {
                warn!(product = %name, key = %key, "merging index entries with the same product name");
                entry.into_mut()
            },
            Entry::Vacant(entry) => entry.insert(Product::new(name.clone())),
        };

        for (version_key, version_doc) in doc.versions {
            let spelling = if version_doc.version.is_empty() {
                version_key
            } else {
                version_doc.version.clone()
            };
            let semver = match SemVer::parse(&spelling) {
                Ok(semver) => semver,
                Err(e) => {
                    warn!(product = %name, version = %spelling, error = %e, "skipping unparsable version");
                    continue;
                },
            };
            let version = decode_version(&name, semver, version_doc);
            if !product.push_unsorted(version) {
                warn!(product = %name, version = %spelling, "duplicate version entry");
            }
        }
    }

    let mut catalog = Catalog::new();
    for (name, mut product) in products {
        for dropped in product.finish_bulk() {
            warn!(product = %name, version = %dropped, "skipping semantically duplicate version");
        }
        catalog.put_product(product);
    }
    Ok(catalog)
}

fn decode_version(product: &str, semver: SemVer, doc: VersionDoc) -> Version {
    let mut version = Version::new(product, semver);
    if let (Some(shasums), signature) = (doc.shasums, doc.shasums_signature) {
        let signature = signature.unwrap_or_else(|| format!("{shasums}.sig"));
        version.set_manifest_refs(shasums, signature);
    }

    for build in doc.builds {
        let url = match Url::parse(&build.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(product, filename = %build.filename, error = %e, "skipping build with invalid URL");
                continue;
            },
        };
        let platform = Platform::new(&build.os, &build.arch);
        version.upsert_build(Build {
            product: product.to_string(),
            version: version.as_str().to_string(),
            os: platform.os,
            arch: platform.arch,
            filename: build.filename,
            url,
        });
    }
    version
}
