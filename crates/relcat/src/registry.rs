//! Per-product shortcut commands (`relcat terraform latest`).
//!
//! Descriptors are keyed by product name and each owns its own copy of
//! that name, so a handler always acts on the product it was registered
//! for.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use relcat_catalog::Catalog;
use tracing::debug;

use crate::cli::{InstallArgs, Invocation};

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct ProductCli {
    #[command(subcommand)]
    action: Option<ProductAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum ProductAction {
    /// List versions, oldest first
    #[command(aliases = ["ls", "versions"])]
    List,

    /// Print the latest version
    Latest,

    /// Install a version; latest when omitted
    Install {
        version: Option<String>,
        #[arg(short, long, default_value = ".")]
        dir:     PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct ProductCommand {
    product: String,
}

impl ProductCommand {
    pub fn product(&self) -> &str { &self.product }

    /// Parses the words after the product name. No action means `latest`.
    pub fn parse(&self, args: &[String]) -> Result<Invocation> {
        let parsed = ProductCli::try_parse_from(args)?;
        let product = self.product.clone();
        Ok(match parsed.action.unwrap_or(ProductAction::Latest) {
            ProductAction::List => Invocation::Versions { product },
            ProductAction::Latest => Invocation::Latest { product },
            ProductAction::Install { version, dir } => Invocation::Install(InstallArgs {
                product,
                version,
                os: None,
                arch: None,
                dir,
            }),
        })
    }
}

/// Shortcut commands for every product in a catalog.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: BTreeMap<String, ProductCommand>,
}

impl Registry {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let commands = catalog
            .list_products()
            .into_iter()
            .map(|name| {
                let command = ProductCommand {
                    product: name.to_string(),
                };
                (name.to_string(), command)
            })
            .collect();
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&ProductCommand> {
        self.commands.get(&relcat_catalog::normalize_name(name))
    }

    /// Resolves `words` (product name first) to an invocation.
    pub fn dispatch(&self, words: &[String]) -> Result<Invocation> {
        let Some((name, rest)) = words.split_first() else {
            bail!("missing product name");
        };
        match self.get(name) {
            Some(command) => {
                debug!(product = command.product(), "product shortcut");
                command.parse(rest)
            },
            None => bail!("unknown command or product '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use relcat_resource::Release;
    use url::Url;

    use super::*;

    fn registry() -> Registry {
        let mut catalog = Catalog::new();
        for name in ["terraform_0.12.3_linux_amd64.zip", "vault_1.0.0_linux_amd64.zip"] {
            let url = Url::parse(&format!("https://releases.example.com/x/{name}")).unwrap();
            catalog.insert(Release::from_url(url).unwrap());
        }
        Registry::from_catalog(&catalog)
    }

    fn words(args: &[&str]) -> Vec<String> { args.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn test_each_descriptor_keeps_its_product() {
        let registry = registry();
        assert!(registry.get("nomad").is_none());
        for name in ["terraform", "vault"] {
            assert_eq!(registry.get(name).unwrap().product(), name);
            assert_eq!(
                registry.dispatch(&words(&[name, "latest"])).unwrap(),
                Invocation::Latest {
                    product: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_actions() {
        let registry = registry();
        assert_eq!(
            registry.dispatch(&words(&["Vault"])).unwrap(),
            Invocation::Latest {
                product: "vault".to_string()
            }
        );
        assert_eq!(
            registry.dispatch(&words(&["vault", "ls"])).unwrap(),
            Invocation::Versions {
                product: "vault".to_string()
            }
        );

        let Invocation::Install(args) = registry
            .dispatch(&words(&["terraform", "install", "0.12.3", "--dir", "bin"]))
            .unwrap()
        else {
            panic!("expected install");
        };
        assert_eq!(args.product, "terraform");
        assert_eq!(args.version.as_deref(), Some("0.12.3"));
        assert_eq!(args.dir, PathBuf::from("bin"));
    }

    #[test]
    fn test_unknown_product_or_action() {
        let registry = registry();
        assert!(registry.dispatch(&words(&["nomad", "latest"])).is_err());
        assert!(registry.dispatch(&words(&["vault", "explode"])).is_err());
        assert!(registry.dispatch(&[]).is_err());
    }
}
