//! Settings layering: built-in defaults, then an optional TOML file, then
//! command-line flags and environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use relcat_catalog::{DEFAULT_PARALLELISM, IndexOptions};
use relcat_fetch::FetchOptions;
use serde::Deserialize;
use url::Url;

use crate::cli::Cli;

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url:             Option<String>,
    pub cache_dir:            Option<PathBuf>,
    pub crawl:                Option<bool>,
    pub parallelism:          Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent:           Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url:    Url,
    pub cache_dir:   PathBuf,
    pub crawl:       bool,
    pub parallelism: usize,
    pub fetch:       FetchOptions,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let defaults = IndexOptions::default();

        let base_url = match cli.base_url.as_ref().or(file.base_url.as_ref()) {
            Some(raw) => Url::parse(raw).with_context(|| format!("invalid base URL '{raw}'"))?,
            None => defaults.base_url,
        };

        let mut fetch = FetchOptions::default();
        if let Some(secs) = file.connect_timeout_secs {
            fetch = fetch.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = file.request_timeout_secs {
            fetch = fetch.request_timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = file.user_agent {
            fetch = fetch.user_agent(agent);
        }

        Ok(Self {
            base_url,
            cache_dir: cli
                .cache_dir
                .clone()
                .or(file.cache_dir)
                .unwrap_or(defaults.cache_dir),
            crawl: cli.crawl || file.crawl.unwrap_or(false),
            parallelism: cli
                .parallelism
                .or(file.parallelism)
                .unwrap_or(DEFAULT_PARALLELISM),
            fetch,
        })
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions::default()
            .base_url(self.base_url.clone())
            .cache_dir(self.cache_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli { Cli::try_parse_from(std::iter::once("relcat").chain(args.iter().copied())).unwrap() }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&cli(&["list"]), FileConfig::default()).unwrap();
        assert_eq!(settings.base_url.as_str(), "https://releases.hashicorp.com/");
        assert_eq!(settings.parallelism, 10);
        assert!(!settings.crawl);
        assert!(settings.cache_dir.ends_with("hashi-releases"));
    }

    #[test]
    fn test_flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
            base_url = "https://file.example.com"
            parallelism = 4
            crawl = true
            request_timeout_secs = 5
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(
            &cli(&["--base-url", "https://flag.example.com", "list"]),
            file.clone(),
        )
        .unwrap();
        assert_eq!(settings.base_url.host_str(), Some("flag.example.com"));
        assert_eq!(settings.parallelism, 4);
        assert!(settings.crawl);
        assert_eq!(settings.fetch.request_timeout, Duration::from_secs(5));

        let settings = Settings::resolve(&cli(&["--parallelism", "2", "list"]), file).unwrap();
        assert_eq!(settings.base_url.host_str(), Some("file.example.com"));
        assert_eq!(settings.parallelism, 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<FileConfig>("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_bad_base_url() {
        assert!(Settings::resolve(&cli(&["--base-url", "not a url", "list"]), FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relcat.toml");
        std::fs::write(&path, "cache_dir = \"/var/cache/relcat\"\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.cache_dir, Some(PathBuf::from("/var/cache/relcat")));
        assert!(FileConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
