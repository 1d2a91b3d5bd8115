//! Shared clients and catalog construction for command handlers.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use relcat_catalog::{Catalog, CrawlOptions, IndexDocumentFetcher, LinkCrawler};
use relcat_fetch::{Fetcher, ReqwestClient};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Settings;

pub struct Context {
    pub settings: Settings,
    pub fetcher:  Arc<Fetcher<ReqwestClient>>,
}

impl Context {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = ReqwestClient::new(&settings.fetch).context("failed to set up HTTP client")?;
        let fetcher = Arc::new(Fetcher::new(client, settings.fetch.clone()));
        Ok(Self { settings, fetcher })
    }

    /// Builds the catalog with the configured ingestion strategy.
    ///
    /// Any ingestion failure is returned as an error; a partially built
    /// catalog is never used.
    pub async fn load_catalog(&self) -> Result<Catalog> {
        if self.settings.crawl {
            self.crawl().await
        } else {
            let fetcher = Fetcher::new(self.fetcher.client().clone(), self.settings.fetch.clone());
            IndexDocumentFetcher::new(fetcher, self.settings.index_options())
                .fetch_index()
                .await
                .context("failed to load release index")
        }
    }

    async fn crawl(&self) -> Result<Catalog> {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling crawl");
                on_interrupt.cancel();
            }
        });

        let options = CrawlOptions::new(self.settings.base_url.clone())
            .parallelism(self.settings.parallelism)
            .cancel_token(cancel);
        let result = LinkCrawler::new(Arc::clone(&self.fetcher), options)
            .crawl()
            .await
            .context("failed to crawl release listings");

        watcher.abort();
        result
    }
}
