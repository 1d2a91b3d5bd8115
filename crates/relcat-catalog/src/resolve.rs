use relcat_resource::Platform;

use crate::{Build, Catalog, Result, Version};

/// Picks the build of a version that matches one platform exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResolver {
    platform: Platform,
}

impl BuildResolver {
    pub fn new(platform: Platform) -> Self { Self { platform } }

    /// Resolver for the platform of the running process.
    pub fn local() -> Self { Self::new(Platform::local()) }

    pub fn platform(&self) -> &Platform { &self.platform }

    pub fn resolve<'a>(&self, version: &'a Version) -> Result<&'a Build> {
        version.resolve_build(&self.platform)
    }

    /// Resolves `version` of `product`, or its latest version when `None`.
    pub fn resolve_in<'a>(
        &self,
        catalog: &'a Catalog,
        product: &str,
        version: Option<&str>,
    ) -> Result<&'a Build> {
        match version {
            Some(version) => self.resolve(catalog.version(product, version)?),
            None => catalog.latest_build(product, &self.platform),
        }
    }
}

/// Build of `version` for the running platform.
pub fn resolve_local_build(version: &Version) -> Result<&Build> { BuildResolver::local().resolve(version) }

#[cfg(test)]
mod tests {
    use relcat_resource::Release;
    use url::Url;

    use super::*;
    use crate::LookupError;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for name in [
            "terraform_0.11.14_linux_amd64.zip",
            "terraform_0.12.3_linux_amd64.zip",
            "terraform_0.12.3_darwin_arm64.zip",
        ] {
            let url = Url::parse(&format!("https://releases.example.com/terraform/x/{name}")).unwrap();
            catalog.insert(Release::from_url(url).unwrap());
        }
        catalog
    }

    #[test]
    fn test_resolve_latest_and_pinned() {
        let catalog = catalog();
        let resolver = BuildResolver::new(Platform::new("linux", "amd64"));

        let latest = resolver.resolve_in(&catalog, "terraform", None).unwrap();
        assert_eq!(latest.version, "0.12.3");

        let pinned = resolver
            .resolve_in(&catalog, "terraform", Some("0.11.14"))
            .unwrap();
        assert_eq!(pinned.filename, "terraform_0.11.14_linux_amd64.zip");
    }

    #[test]
    fn test_no_architecture_fallback() {
        let catalog = catalog();
        let resolver = BuildResolver::new(Platform::new("darwin", "amd64"));
        assert!(matches!(
            resolver.resolve_in(&catalog, "terraform", None),
            Err(LookupError::BuildNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_local_matches_local_platform() {
        let mut catalog = Catalog::new();
        let local = Platform::local();
        let name = format!("vault_1.0.0_{}_{}.zip", local.os, local.arch);
        let url = Url::parse(&format!("https://releases.example.com/vault/1.0.0/{name}")).unwrap();
        catalog.insert(Release::from_url(url).unwrap());

        let version = catalog.version("vault", "1.0.0").unwrap();
        assert_eq!(resolve_local_build(version).unwrap().filename, name);
    }
}
