use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::parser;
use crate::types::{RawArticle, RegwatchError, Result};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetch and parse every endpoint, concatenating the articles in endpoint
    /// order. A failing endpoint is logged and skipped; it never aborts the
    /// others.
    pub async fn fetch_all(&self, endpoints: &[String]) -> Vec<RawArticle> {
        let outcomes: Vec<(String, Result<Vec<RawArticle>>)> =
            stream::iter(endpoints.iter().cloned())
                .map(|url| async move {
                    let outcome = self.fetch_endpoint(&url).await;
                    (url, outcome)
                })
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

        let mut articles = Vec::new();
        for (url, outcome) in outcomes {
            match outcome {
                Ok(mut batch) => {
                    debug!("Fetched {} articles from {}", batch.len(), url);
                    articles.append(&mut batch);
                }
                Err(e) => {
                    error!("Skipping feed {}: {}", url, e);
                }
            }
        }
        articles
    }

    /// Fetch one endpoint and parse its body into articles.
    pub async fn fetch_endpoint(&self, url: &str) -> Result<Vec<RawArticle>> {
        let body = self.fetch_feed(url).await?;
        parser::parse_articles(&body)
    }

    /// Fetch the raw feed document with retries. Server errors and transport
    /// failures are retried with exponential backoff; client errors are not,
    /// a 404 will still be a 404 on the next attempt.
    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)?;
        debug!("Fetching feed: {}", parsed);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 30)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(parsed.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        // Body reads can still fail mid-transfer; treat that
                        // like any other transport error and retry.
                        match response.text().await {
                            Ok(content) => {
                                info!("Fetched feed: {} ({} bytes)", url, content.len());
                                return Ok(content);
                            }
                            Err(e) => {
                                last_error = Some(RegwatchError::Http(e));
                            }
                        }
                    } else {
                        last_error = Some(RegwatchError::FeedStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });

                        if status.is_client_error() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(RegwatchError::Http(e));
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        "Attempt {} failed for {}, retrying in {:?}",
                        attempt + 1,
                        url,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                break;
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegwatchError::General(format!("Failed to fetch {}", url))))
    }
}
