use std::sync::Arc;

use relcat_verify::ManifestSource;
use url::Url;

use crate::{FetchError, Fetcher, HttpClient, Result};

/// `<base>/<product>/<version>/<manifest_ref>`
///
/// `manifest_ref` must be a single file name; usually it is
/// [`manifest_name`](relcat_resource::manifest_name) or what the index
/// document recorded for the release.
pub fn manifest_url(base: &Url, product: &str, version: &str, manifest_ref: &str) -> Result<Url> {
    if manifest_ref.is_empty() || manifest_ref.contains(['/', '\\']) || manifest_ref == ".." {
        return Err(FetchError::InvalidUrl(format!(
            "manifest reference '{manifest_ref}' is not a file name"
        )));
    }

    let mut base = base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(&format!("{product}/{version}/{manifest_ref}"))
        .map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))
}

/// Serves checksum manifests from a releases site over HTTP.
pub struct HttpManifestSource<C> {
    fetcher:  Arc<Fetcher<C>>,
    base_url: Url,
}

impl<C: HttpClient> HttpManifestSource<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>, base_url: Url) -> Self { Self { fetcher, base_url } }

    pub fn base_url(&self) -> &Url { &self.base_url }
}

impl<C: HttpClient> ManifestSource for HttpManifestSource<C> {
    type Error = FetchError;

    async fn manifest_text(
        &self,
        product: &str,
        version: &str,
        manifest_ref: &str,
    ) -> Result<String> {
        let url = manifest_url(&self.base_url, product, version, manifest_ref)?;
        self.fetcher.fetch_text(url.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use relcat_resource::manifest_name;
    use relcat_verify::{IntegrityVerifier, Sha256Hasher, VerifyError};

    use super::*;
    use crate::{FetchOptions, MockHttpClient, MockResponse};

    #[test]
    fn test_manifest_url() {
        let expected = "https://releases.example.com/terraform/0.12.3/terraform_0.12.3_SHA256SUMS";
        let default_ref = manifest_name("terraform", "0.12.3");
        for base in ["https://releases.example.com", "https://releases.example.com/"] {
            let url =
                manifest_url(&Url::parse(base).unwrap(), "terraform", "0.12.3", &default_ref).unwrap();
            assert_eq!(url.as_str(), expected);
        }

        let nested = Url::parse("https://mirror.example.com/hashicorp").unwrap();
        assert_eq!(
            manifest_url(&nested, "vault", "1.0.0", "vault_1.0.0_SHA256SUMS.txt")
                .unwrap()
                .as_str(),
            "https://mirror.example.com/hashicorp/vault/1.0.0/vault_1.0.0_SHA256SUMS.txt"
        );
    }

    #[test]
    fn test_manifest_ref_must_be_a_file_name() {
        let base = Url::parse("https://releases.example.com").unwrap();
        for bad in ["", "..", "../../secrets", "a/b", "a\\b"] {
            assert!(
                matches!(manifest_url(&base, "vault", "1.0.0", bad), Err(FetchError::InvalidUrl(_))),
                "{bad}"
            );
        }
    }

    #[tokio::test]
    async fn test_verifier_over_http() {
        let content = b"archive bytes";
        let filename = "vault_1.0.0_linux_amd64.zip";
        let manifest = format!("{}  {filename}\n", hex::encode(Sha256Hasher::digest(content)));

        let client = MockHttpClient::new().route(
            "https://releases.example.com/vault/1.0.0/vault_1.0.0_SHA256SUMS",
            MockResponse::ok(manifest),
        );
        let fetcher = Arc::new(Fetcher::new(client, FetchOptions::default()));
        let base = Url::parse("https://releases.example.com").unwrap();
        let verifier = IntegrityVerifier::new(HttpManifestSource::new(fetcher, base));

        verifier.verify(filename, content).await.unwrap();
        assert!(matches!(
            verifier.verify(filename, b"archive bytez").await,
            Err(VerifyError::DigestMismatch { .. })
        ));
        assert!(matches!(
            verifier.verify("vault_2.0.0_linux_amd64.zip", content).await,
            Err(VerifyError::ManifestFetch { .. })
        ));
    }
}
