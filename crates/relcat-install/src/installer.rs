use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use relcat_catalog::{Build, BuildResolver, Catalog};
use relcat_fetch::{Fetcher, HttpClient, HttpManifestSource};
use relcat_fs::AtomicWriteOptions;
use relcat_resource::Platform;
use relcat_verify::{IntegrityVerifier, ManifestSource};
use tracing::info;
use url::Url;

use crate::{InstallError, Result};

/// Name of the executable inside a product's archive.
pub fn binary_name(product: &str, platform: &Platform) -> String {
    if platform.is_windows() {
        format!("{product}.exe")
    } else {
        product.to_string()
    }
}

/// Where an install put its file.
#[derive(Debug, Clone)]
pub struct Installed {
    pub build: Build,
    pub path:  PathBuf,
}

/// Downloads builds and places them once they are verified.
///
/// Nothing is written to a destination directory before
/// [`IntegrityVerifier::verify_with_ref`] has accepted the downloaded bytes.
pub struct Installer<C, S> {
    fetcher:  Arc<Fetcher<C>>,
    verifier: IntegrityVerifier<S>,
    resolver: BuildResolver,
}

impl<C: HttpClient> Installer<C, HttpManifestSource<C>> {
    /// Installer that reads manifests from the releases site at `base_url`.
    pub fn over_http(fetcher: Arc<Fetcher<C>>, base_url: Url) -> Self {
        let source = HttpManifestSource::new(Arc::clone(&fetcher), base_url);
        Self::new(fetcher, IntegrityVerifier::new(source))
    }
}

impl<C: HttpClient, S: ManifestSource> Installer<C, S> {
    /// Installs for the local platform unless [`Installer::platform`] says
    /// otherwise.
    pub fn new(fetcher: Arc<Fetcher<C>>, verifier: IntegrityVerifier<S>) -> Self {
        Self {
            fetcher,
            verifier,
            resolver: BuildResolver::local(),
        }
    }

    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.resolver = BuildResolver::new(platform);
        self
    }

    pub fn verifier(&self) -> &IntegrityVerifier<S> { &self.verifier }

    /// Raw artifact bytes. Not yet trusted.
    pub async fn download(&self, build: &Build) -> Result<Bytes> {
        Ok(self.fetcher.download(build.url.as_str()).await?)
    }

    /// Artifact bytes that passed checksum verification against the
    /// manifest file `manifest_ref` of the build's release.
    pub async fn download_verified(&self, build: &Build, manifest_ref: &str) -> Result<Bytes> {
        let bytes = self.download(build).await?;
        self.verifier
            .verify_with_ref(&build.filename, manifest_ref, &bytes)
            .await?;
        Ok(bytes)
    }

    /// The build to fetch and the manifest its release recorded.
    fn resolve(
        &self,
        catalog: &Catalog,
        product: &str,
        version: Option<&str>,
    ) -> Result<(Build, String)> {
        let build = self.resolver.resolve_in(catalog, product, version)?.clone();
        let manifest_ref = catalog
            .version(&build.product, &build.version)?
            .shasums()
            .to_string();
        Ok((build, manifest_ref))
    }

    /// Resolves, downloads and verifies a build, then extracts the product
    /// executable into `dest_dir`.
    pub async fn install(
        &self,
        catalog: &Catalog,
        product: &str,
        version: Option<&str>,
        dest_dir: &Path,
    ) -> Result<Installed> {
        let (build, manifest_ref) = self.resolve(catalog, product, version)?;
        let archive = self.download_verified(&build, &manifest_ref).await?;

        let entry = binary_name(&build.product, &build.platform());
        let path = dest_dir.join(&entry);
        blocking({
            let path = path.clone();
            move || {
                relcat_archive::extract_entry_to(
                    &archive,
                    &entry,
                    &path,
                    AtomicWriteOptions::new().executable(),
                )
                .map_err(InstallError::from)
            }
        })
        .await?;

        info!(filename = %build.filename, path = %path.display(), "installed");
        Ok(Installed { build, path })
    }

    /// Resolves, downloads and verifies a build, then stores the archive
    /// itself as `dest_dir/<filename>`.
    pub async fn save_archive(
        &self,
        catalog: &Catalog,
        product: &str,
        version: Option<&str>,
        dest_dir: &Path,
    ) -> Result<Installed> {
        let (build, manifest_ref) = self.resolve(catalog, product, version)?;
        let archive = self.download_verified(&build, &manifest_ref).await?;

        let path = dest_dir.join(&build.filename);
        blocking({
            let path = path.clone();
            move || {
                relcat_fs::atomic_write(&path, &archive, AtomicWriteOptions::new())
                    .map_err(InstallError::from)
            }
        })
        .await?;

        info!(filename = %build.filename, path = %path.display(), "saved archive");
        Ok(Installed { build, path })
    }
}

async fn blocking<F>(work: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| InstallError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_name() {
        assert_eq!(binary_name("terraform", &Platform::new("linux", "amd64")), "terraform");
        assert_eq!(
            binary_name("terraform", &Platform::new("windows", "amd64")),
            "terraform.exe"
        );
    }
}
