use crate::error::{Result, ScanError};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Source of page bodies for the crawler.
///
/// Implementations are shared by every crawl task at once, so they must be cheap to
/// call concurrently without external locking.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// `reqwest`-backed fetcher with a pooled, connection-reusing client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(connect_timeout: Duration, user_agent: &str, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(normal_redirects(max_redirects))
            .build()
            .map_err(|e| ScanError::ClientError(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() && body.is_empty() {
            return Err(ScanError::StatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(body)
    }
}

/// Follow redirects up to `max`, refusing any https -> http downgrade.
fn normal_redirects(max: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max {
            return attempt.error("too many redirects");
        }

        let downgrade = attempt.url().scheme() == "http"
            && attempt
                .previous()
                .last()
                .is_some_and(|prev| prev.scheme() == "https");

        if downgrade {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}
