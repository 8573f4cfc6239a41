use crate::error::{Result, ScanError};
use crate::extract::{extract_links, LinkExtractor};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::hyperlink::Hyperlink;
use crate::registry::Registry;
use crate::result::{flatten_labels, CrawlOutcome, LabelPolicy};
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Called once per visited page with the page's link and the number of known URLs.
pub type ProgressCallback = Arc<dyn Fn(&Hyperlink, usize) + Send + Sync>;
/// Decides whether a candidate found on a page (second argument) may be followed from
/// that page (first argument).
pub type ScopeFilter = Arc<dyn Fn(&Hyperlink, &Hyperlink) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub connect_timeout: Duration,
    /// Window after the root task starts during which new child tasks may be spawned.
    pub max_duration: Duration,
    pub label_policy: LabelPolicy,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            max_duration: Duration::from_secs(5 * 60),
            label_policy: LabelPolicy::default(),
            user_agent: format!("linkscraper/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// Same-site scope: follow a link only if it shares the page's site identity.
pub fn same_site() -> ScopeFilter {
    Arc::new(|page: &Hyperlink, candidate: &Hyperlink| page.shares_site_with(candidate))
}

pub struct Crawler<F: Fetcher = HttpFetcher> {
    fetcher: Arc<F>,
    config: CrawlerConfig,
    extractor: LinkExtractor,
    scope_filter: ScopeFilter,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<HttpFetcher> {
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlerConfig::default())
    }

    pub fn with_config(config: CrawlerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(
            config.connect_timeout,
            &config.user_agent,
            config.max_redirects,
        )?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(fetcher: F, config: CrawlerConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
            extractor: extract_links,
            scope_filter: same_site(),
            progress_callback: None,
        }
    }

    pub fn with_extractor(mut self, extractor: LinkExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_scope_filter(mut self, filter: ScopeFilter) -> Self {
        self.scope_filter = filter;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawl everything reachable from `seed` within its site.
    ///
    /// Every call gets a fresh registry and deadline. Failures inside the task tree are
    /// logged and counted on the outcome; only an unusable seed is an error.
    pub async fn crawl(&self, seed: &Url) -> Result<CrawlOutcome> {
        if !matches!(seed.scheme(), "http" | "https") || seed.host_str().is_none() {
            return Err(ScanError::InvalidUrl(format!(
                "seed must be an absolute http(s) URL with a host: {}",
                seed
            )));
        }

        let seed = Hyperlink::new(seed.clone(), "");
        info!(
            "Starting crawl of {} (site '{}', propagation window {:?})",
            seed.url(),
            seed.site(),
            self.config.max_duration
        );

        let started = Instant::now();
        let context = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            registry: Registry::new(),
            max_duration: self.config.max_duration,
            deadline: OnceLock::new(),
            extractor: self.extractor,
            scope_filter: self.scope_filter.clone(),
            progress_callback: self.progress_callback.clone(),
            pages_visited: AtomicUsize::new(0),
            failed_fetches: AtomicUsize::new(0),
            failed_tasks: AtomicUsize::new(0),
        });

        let root = tokio::spawn(crawl_page(context.clone(), seed.clone(), 0));
        let discovered = match root.await {
            Ok(links) => links,
            Err(e) => {
                context.failed_tasks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Root crawl task failed: {}. Result is incomplete.",
                    ScanError::from(e)
                );
                Vec::new()
            }
        };

        let labels = context.registry.snapshot().await;
        let mut links = match self.config.label_policy {
            LabelPolicy::Accumulated => flatten_labels(&labels),
            LabelPolicy::FirstSeen => {
                let mut links = Vec::with_capacity(discovered.len() + 1);
                links.push(seed.clone());
                links.extend(discovered);
                links
            }
        };
        links.sort();

        let mut outcome = CrawlOutcome::new(seed);
        outcome.links = links;
        outcome.labels = labels;
        outcome.pages_visited = context.pages_visited.load(Ordering::Relaxed);
        outcome.failed_fetches = context.failed_fetches.load(Ordering::Relaxed);
        outcome.failed_tasks = context.failed_tasks.load(Ordering::Relaxed);
        outcome.elapsed = started.elapsed();

        info!(
            "Crawl complete. Visited {} pages, {} unique URLs, {} links in {:?}",
            outcome.pages_visited,
            outcome.unique_urls(),
            outcome.links.len(),
            outcome.elapsed
        );
        if outcome.is_incomplete() {
            warn!(
                "{} crawl task(s) failed; the result may be incomplete",
                outcome.failed_tasks
            );
        }

        Ok(outcome)
    }
}

/// Crawl `seed` with a default HTTP fetcher and return the discovered links.
pub async fn crawl(
    seed: &Url,
    connect_timeout: Duration,
    max_duration: Duration,
) -> Result<Vec<Hyperlink>> {
    let config = CrawlerConfig {
        connect_timeout,
        max_duration,
        ..CrawlerConfig::default()
    };
    let outcome = Crawler::with_config(config)?.crawl(seed).await?;
    Ok(outcome.links)
}

/// State shared by every task of one crawl.
struct CrawlContext<F> {
    fetcher: Arc<F>,
    registry: Registry,
    max_duration: Duration,
    /// Set by the root task; `None` inside means the window never closes.
    deadline: OnceLock<Option<Instant>>,
    extractor: LinkExtractor,
    scope_filter: ScopeFilter,
    progress_callback: Option<ProgressCallback>,
    pages_visited: AtomicUsize,
    failed_fetches: AtomicUsize,
    failed_tasks: AtomicUsize,
}

/// One crawl task: fetch `link`, claim its new in-scope links, spawn a child task for
/// each while the window is open, then wait for all of them.
///
/// The result holds every link this task claimed followed by its children's results.
fn crawl_page<F: Fetcher>(
    ctx: Arc<CrawlContext<F>>,
    link: Hyperlink,
    depth: usize,
) -> BoxFuture<'static, Vec<Hyperlink>> {
    async move {
        if depth == 0 {
            ctx.registry.register_seed(&link).await;
        }
        let deadline = *ctx
            .deadline
            .get_or_init(|| Instant::now().checked_add(ctx.max_duration));

        let known = ctx.registry.len().await;
        debug!(
            "Visiting {} (label '{}', depth {}, {} known URLs)",
            link.url(),
            link.label(),
            depth,
            known
        );
        if let Some(ref callback) = ctx.progress_callback {
            callback(&link, known);
        }
        ctx.pages_visited.fetch_add(1, Ordering::Relaxed);

        let body = match ctx.fetcher.fetch(link.url()).await {
            Ok(body) => body,
            Err(e) => {
                ctx.failed_fetches.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Failed to fetch {}: {}. Link stays recorded but will not propagate.",
                    link.url(),
                    e
                );
                String::new()
            }
        };

        let mut discovered = Vec::new();
        for candidate in (ctx.extractor)(&body) {
            if !(ctx.scope_filter)(&link, &candidate) {
                continue;
            }
            if ctx.registry.try_claim(&candidate).await {
                debug!("  -> claimed {}", candidate.url());
                discovered.push(candidate);
            } else {
                debug!("  -> already known {}", candidate.url());
            }
        }

        let mut children = Vec::with_capacity(discovered.len());
        for (spawned, child) in discovered.iter().enumerate() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                info!(
                    "Propagation window of {:?} is over; {} link(s) from {} will not be crawled",
                    ctx.max_duration,
                    discovered.len() - spawned,
                    link.url()
                );
                break;
            }
            let handle = tokio::spawn(crawl_page(ctx.clone(), child.clone(), depth + 1));
            children.push((child.url().clone(), handle));
        }

        let mut results = discovered;
        for (url, handle) in children {
            match handle.await {
                Ok(links) => results.extend(links),
                Err(e) => {
                    ctx.failed_tasks.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Crawl task for {} failed: {}. Result may be incomplete.",
                        url,
                        ScanError::from(e)
                    );
                }
            }
        }

        results
    }
    .boxed()
}
