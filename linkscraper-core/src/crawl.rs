use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use linkscraper_scanner::{
    CrawlOutcome, Crawler, CrawlerConfig, Hyperlink, LabelPolicy, ProgressCallback,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_DURATION_MINUTES: u64 = 5;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seed: Url,
    pub timeout_secs: u64,
    pub max_duration_minutes: u64,
    pub label_policy: LabelPolicy,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: Url) -> Self {
        Self {
            seed,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
            label_policy: LabelPolicy::default(),
            show_progress_bars: false,
        }
    }

    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            connect_timeout: Duration::from_secs(self.timeout_secs),
            max_duration: Duration::from_secs(self.max_duration_minutes.saturating_mul(60)),
            label_policy: self.label_policy,
            ..CrawlerConfig::default()
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl outcome
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome> {
    let config = options.crawler_config();

    // Single spinner for the whole crawl (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("invalid progress bar template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let visited_count = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let count_clone = visited_count.clone();
    let callback_clone = progress_callback.clone();
    let page_callback: ProgressCallback = Arc::new(move |link: &Hyperlink, known: usize| {
        let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(ref pb) = pb_clone {
            pb.set_message(format!(
                "Crawling... {} pages visited, {} URLs known ({})",
                count,
                known,
                extract_url_path(link.url().as_str())
            ));
        }
        if let Some(ref callback) = callback_clone {
            callback(format!("Visiting {}", link.url()));
        }
    });

    let crawler = Crawler::with_config(config)
        .context("failed to set up the HTTP client")?
        .with_progress_callback(page_callback);

    if let Some(ref callback) = progress_callback {
        callback(format!("Crawling {}", options.seed));
    }

    let crawled = crawler.crawl(&options.seed).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }
    let outcome = crawled.with_context(|| format!("failed to crawl {}", options.seed))?;
    info!(
        "Crawl of {} finished: {} links, {} pages visited",
        options.seed,
        outcome.links.len(),
        visited_count.load(Ordering::Relaxed)
    );

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawl complete! {} pages visited",
            visited_count.load(Ordering::Relaxed)
        ));
    }

    Ok(outcome)
}
