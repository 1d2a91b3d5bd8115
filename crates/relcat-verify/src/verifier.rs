use std::fs::File;
use std::future::Future;
use std::path::Path;

use relcat_resource::{ArtifactName, manifest_name};
use tracing::debug;

use crate::{ChecksumManifest, DigestReader, Result, Sha256Hasher, VerifyError};

/// Where checksum manifests come from.
pub trait ManifestSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the raw text of the manifest file `manifest_ref` published
    /// for one (product, version).
    fn manifest_text(
        &self,
        product: &str,
        version: &str,
        manifest_ref: &str,
    ) -> impl Future<Output = std::result::Result<String, Self::Error>> + Send;
}

/// Verifies artifact bytes against the manifest published for them.
pub struct IntegrityVerifier<S> {
    source: S,
}

impl<S: ManifestSource> IntegrityVerifier<S> {
    pub fn new(source: S) -> Self { Self { source } }

    pub fn source(&self) -> &S { &self.source }

    /// Manifest under its conventional `<product>_<version>_SHA256SUMS` name.
    pub async fn fetch_manifest(&self, product: &str, version: &str) -> Result<ChecksumManifest> {
        self.fetch_manifest_ref(product, version, &manifest_name(product, version))
            .await
    }

    pub async fn fetch_manifest_ref(
        &self,
        product: &str,
        version: &str,
        manifest_ref: &str,
    ) -> Result<ChecksumManifest> {
        let text = self
            .source
            .manifest_text(product, version, manifest_ref)
            .await
            .map_err(|e| VerifyError::ManifestFetch {
                product: product.to_string(),
                version: version.to_string(),
                source:  Box::new(e),
            })?;
        ChecksumManifest::parse(&text)
    }

    /// Succeeds only if `content` hashes to the digest recorded for
    /// `filename` in its release's conventionally named manifest.
    pub async fn verify(&self, filename: &str, content: &[u8]) -> Result<()> {
        let name = ArtifactName::parse(filename)?;
        let manifest_ref = manifest_name(name.product(), name.version());
        self.check(&name, &manifest_ref, content).await
    }

    /// Like [`IntegrityVerifier::verify`], against the manifest file a
    /// catalog recorded for the release.
    pub async fn verify_with_ref(
        &self,
        filename: &str,
        manifest_ref: &str,
        content: &[u8],
    ) -> Result<()> {
        let name = ArtifactName::parse(filename)?;
        self.check(&name, manifest_ref, content).await
    }

    async fn check(&self, name: &ArtifactName, manifest_ref: &str, content: &[u8]) -> Result<()> {
        let manifest = self
            .fetch_manifest_ref(name.product(), name.version(), manifest_ref)
            .await?;
        manifest.check(name.filename(), content)?;
        debug!(filename = name.filename(), manifest_ref, "checksum verified");
        Ok(())
    }

    /// Verifies a file on disk by its base name, streaming its content
    /// through the hasher on the blocking pool.
    pub async fn verify_file(&self, path: &Path) -> Result<()> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VerifyError::NoFileName(path.to_path_buf()))?;
        let name = ArtifactName::parse(filename)?;
        let manifest = self.fetch_manifest(name.product(), name.version()).await?;

        let owned = path.to_path_buf();
        let actual = tokio::task::spawn_blocking(move || {
            DigestReader::new(File::open(owned)?, Sha256Hasher::new()).finish()
        })
        .await
        .map_err(|e| VerifyError::Task(e.to_string()))??;

        manifest.check_digest(filename, &actual)?;
        debug!(path = %path.display(), "checksum verified");
        Ok(())
    }
}
