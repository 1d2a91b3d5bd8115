//! Catalog construction by crawling directory-listing pages.
//!
//! A coordinator owns the frontier and the visited set and keeps at most
//! `parallelism` page fetches in flight. Page workers send every archive
//! link they find, as a [`Release`], over a bounded queue to one consumer
//! task. That consumer is the only code that touches the [`Catalog`].

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use relcat_fetch::{Fetcher, HttpClient};
use relcat_resource::{Release, strip_archive_extension};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::{Catalog, IngestionError};

static HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"'#?]+)[^"']*["']"#).unwrap());

pub const DEFAULT_PARALLELISM: usize = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    root:           Url,
    allowed_host:   Option<String>,
    parallelism:    usize,
    queue_capacity: usize,
    cancel:         CancellationToken,
}

impl CrawlOptions {
    /// Crawl everything below `root` on `root`'s host.
    pub fn new(mut root: Url) -> Self {
        if !root.path().ends_with('/') {
            root.set_path(&format!("{}/", root.path()));
        }
        Self {
            allowed_host: root.host_str().map(str::to_string),
            root,
            parallelism: DEFAULT_PARALLELISM,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn allowed_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_host = Some(host.into());
        self
    }

    /// Simultaneous page fetches. Clamped to at least one.
    #[must_use]
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn root(&self) -> &Url { &self.root }

    pub fn cancel(&self) -> &CancellationToken { &self.cancel }

    /// Whether `url` may be visited: same host, under the root path.
    fn in_scope(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
            && url.host_str() == self.allowed_host.as_deref()
            && url.port_or_known_default() == self.root.port_or_known_default()
            && url.path().starts_with(self.root.path())
    }
}

/// Resolves every `href` on `page` against `base`. Query and fragment are
/// dropped.
pub fn extract_links(base: &Url, page: &str) -> Vec<Url> {
    HREF_REGEX
        .captures_iter(page)
        .filter_map(|caps| base.join(caps.get(1)?.as_str().trim()).ok())
        .map(|mut url| {
            url.set_query(None);
            url.set_fragment(None);
            url
        })
        .collect()
}

/// Builds a [`Catalog`] by recursively visiting listing pages.
pub struct LinkCrawler<C> {
    fetcher: Arc<Fetcher<C>>,
    options: CrawlOptions,
}

impl<C: HttpClient + 'static> LinkCrawler<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>, options: CrawlOptions) -> Self { Self { fetcher, options } }

    pub fn fetcher(&self) -> &Fetcher<C> { &self.fetcher }

    pub fn options(&self) -> &CrawlOptions { &self.options }

    /// Crawls until no page is in flight and no unvisited link remains,
    /// then waits for the consumer to drain the queue.
    ///
    /// Pages that fail to load are logged and skipped. Firing the cancel
    /// token stops both the workers and the consumer.
    pub async fn crawl(&self) -> Result<Catalog, IngestionError> {
        let options = Arc::new(self.options.clone());
        let cancel = options.cancel.clone();
        let (tx, rx) = mpsc::channel(options.queue_capacity);
        let consumer = tokio::spawn(consume(rx, cancel.clone()));

        let mut visited = HashSet::from([options.root.clone()]);
        let mut frontier = VecDeque::from([options.root.clone()]);
        let mut workers = JoinSet::new();
        let mut pages = 0usize;

        loop {
            while workers.len() < options.parallelism
                && let Some(url) = frontier.pop_front()
            {
                pages += 1;
                workers.spawn(visit(
                    Arc::clone(&self.fetcher),
                    Arc::clone(&options),
                    url,
                    tx.clone(),
                ));
            }

            if workers.is_empty() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    workers.abort_all();
                    break;
                }
                joined = workers.join_next() => match joined {
                    Some(Ok(links)) => {
                        for link in links {
                            if visited.insert(link.clone()) {
                                frontier.push_back(link);
                            }
                        }
                    },
                    Some(Err(e)) => warn!(error = %e, "page task failed"),
                    None => {},
                },
            }
        }

        drop(tx);
        let catalog = consumer
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))?;

        if cancel.is_cancelled() {
            info!(pages, "crawl cancelled");
            return Err(IngestionError::Cancelled);
        }

        info!(pages, products = catalog.len(), "crawl finished");
        Ok(catalog)
    }
}

/// Loads one page, sends its releases and returns its in-scope subdirectories.
async fn visit<C: HttpClient>(
    fetcher: Arc<Fetcher<C>>,
    options: Arc<CrawlOptions>,
    url: Url,
    tx: mpsc::Sender<Release>,
) -> Vec<Url> {
    let page = match fetcher.fetch_text(url.as_str()).await {
        Ok(page) => page,
        Err(e) => {
            warn!(%url, error = %e, "skipping page");
            return Vec::new();
        },
    };
    debug!(%url, "visited page");

    let mut subdirs = Vec::new();
    for link in extract_links(&url, &page) {
        if !options.in_scope(&link) {
            continue;
        }
        if link.path().ends_with('/') {
            subdirs.push(link);
            continue;
        }

        let is_archive = link
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(strip_archive_extension)
            .is_some();
        if !is_archive {
            continue;
        }

        match Release::from_url(link) {
            Ok(release) => {
                debug!(filename = %release.filename, "discovered release");
                if tx.send(release).await.is_err() {
                    break;
                }
            },
            Err(e) => debug!(error = %e, "dropping unparsable artifact link"),
        }
    }
    subdirs
}

/// Sole writer of the catalog under construction.
async fn consume(mut rx: mpsc::Receiver<Release>, cancel: CancellationToken) -> Catalog {
    let mut catalog = Catalog::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(release) => catalog.insert(release),
                None => break,
            },
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links() {
        let base = Url::parse("https://releases.example.com/terraform/").unwrap();
        let page = r#"<ul>
            <li><a href="../">../</a></li>
            <li><a href="/terraform/0.12.3/">terraform_0.12.3</a></li>
            <li><a href='0.11.14/?sort=asc'>terraform_0.11.14</a></li>
            <li><a HREF="https://other.example.org/x.zip">x</a></li>
        </ul>"#;

        let links: Vec<String> = extract_links(&base, page).into_iter().map(String::from).collect();
        assert_eq!(links, [
            "https://releases.example.com/",
            "https://releases.example.com/terraform/0.12.3/",
            "https://releases.example.com/terraform/0.11.14/",
            "https://other.example.org/x.zip",
        ]);
    }

    #[test]
    fn test_scope() {
        let options = CrawlOptions::new(Url::parse("https://releases.example.com/hashicorp").unwrap());
        let ok = |s: &str| options.in_scope(&Url::parse(s).unwrap());

        assert_eq!(options.root().as_str(), "https://releases.example.com/hashicorp/");
        assert!(ok("https://releases.example.com/hashicorp/vault/"));
        assert!(!ok("https://releases.example.com/"));
        assert!(!ok("https://releases.example.com/other/"));
        assert!(!ok("https://evil.example.com/hashicorp/vault/"));
        assert!(!ok("ftp://releases.example.com/hashicorp/vault/"));
    }

    #[test]
    fn test_parallelism_clamped() {
        let options = CrawlOptions::new(Url::parse("https://releases.example.com/").unwrap())
            .parallelism(0)
            .queue_capacity(0);
        assert_eq!(options.parallelism, 1);
        assert_eq!(options.queue_capacity, 1);
    }
}
