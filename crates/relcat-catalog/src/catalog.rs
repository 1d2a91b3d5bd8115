use std::collections::BTreeMap;

use relcat_resource::{Platform, Release};
use tracing::trace;

use crate::{Build, LookupError, Product, Result, Version};

/// Product names are matched case-insensitively and without surrounding
/// whitespace.
pub fn normalize_name(name: &str) -> String { name.trim().to_ascii_lowercase() }

/// In-memory product → version → build index.
///
/// Populated once by an ingestion source, then only read. Mutation takes
/// `&mut self`, so concurrent discovery must funnel through a single owner.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    /// Records one discovered build.
    ///
    /// The version is located by semantic value and inserted in order if new;
    /// a build already present for the same platform is replaced.
    pub fn insert(&mut self, release: Release) {
        let name = normalize_name(&release.product);
        let product = self
            .products
            .entry(name.clone())
            .or_insert_with(|| Product::new(name.clone()));
        let version = product.upsert_version(release.version);

        let build = Build {
            product:  name,
            version:  version.as_str().to_string(),
            os:       release.platform.os,
            arch:     release.platform.arch,
            filename: release.filename,
            url:      release.url,
        };
        trace!(filename = %build.filename, "catalog insert");
        version.upsert_build(build);
    }

    /// Adds a fully built product, replacing any product with the same name.
    pub(crate) fn put_product(&mut self, product: Product) {
        self.products.insert(product.name().to_string(), product);
    }

    pub fn product(&self, name: &str) -> Result<&Product> {
        let key = normalize_name(name);
        self.products
            .get(&key)
            .ok_or(LookupError::ProductNotFound { product: key })
    }

    /// Normalized product names in lexical order.
    pub fn list_products(&self) -> Vec<&str> { self.products.keys().map(String::as_str).collect() }

    /// Version strings of `product`, ascending.
    pub fn list_versions(&self, product: &str) -> Result<Vec<&str>> {
        Ok(self.product(product)?.version_strings())
    }

    pub fn latest_version(&self, product: &str) -> Result<&str> {
        let product = self.product(product)?;
        product
            .latest()
            .map(Version::as_str)
            .ok_or_else(|| LookupError::NoVersions {
                product: product.name().to_string(),
            })
    }

    pub fn version(&self, product: &str, version: &str) -> Result<&Version> {
        let product = self.product(product)?;
        product
            .version(version)
            .ok_or_else(|| LookupError::VersionNotFound {
                product: product.name().to_string(),
                version: version.to_string(),
            })
    }

    /// Build of the latest version of `product` for `platform`.
    pub fn latest_build(&self, product: &str, platform: &Platform) -> Result<&Build> {
        let product = self.product(product)?;
        let latest = product.latest().ok_or_else(|| LookupError::NoVersions {
            product: product.name().to_string(),
        })?;
        latest.resolve_build(platform)
    }

    /// Number of products.
    pub fn len(&self) -> usize { self.products.len() }

    pub fn is_empty(&self) -> bool { self.products.is_empty() }
}
