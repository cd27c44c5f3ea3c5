use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use regwatch::config::FetchConfig;
use regwatch::inference::{
    InferenceBackend, InferenceError, InferenceResult, ModelHandle, ScoredLabel, SummaryParams,
};
use regwatch::{Classifier, Fetcher, Pipeline, Summarizer};

/// Build an RSS 2.0 document with one item per (title, description) pair.
/// Links are derived from the item index so assertions can target them.
pub fn rss_feed(items: &[(&str, &str)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Test feed</title>"#,
    );
    for (i, (title, description)) in items.iter().enumerate() {
        body.push_str(&format!(
            "<item><title>{title}</title><description>{description}</description>\
             <link>https://example.com/item-{i}</link>\
             <pubDate>Mon, 06 Sep 2021 10:00:00 GMT</pubDate></item>"
        ));
    }
    body.push_str("</channel></rss>");
    body
}

/// Pipeline wired for tests: no fetch retries, small concurrency.
pub fn test_pipeline(models: Arc<ModelHandle>) -> Pipeline {
    let fetcher = Fetcher::new(FetchConfig {
        timeout_seconds: 5,
        max_retries: 0,
        ..FetchConfig::default()
    });
    let classifier = Classifier::new(models.clone());
    let summarizer = Summarizer::new(models);
    Pipeline::new(fetcher, classifier, summarizer).with_inference_concurrency(2)
}

/// Backend with a fixed verdict and call counters, for driving the pipeline
/// deterministically and asserting which capabilities were exercised.
pub struct ScriptedBackend {
    urgent: bool,
    fail_ranking: bool,
    panic_ranking: bool,
    summary: Option<String>,
    rank_calls: AtomicUsize,
    summarize_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn build(urgent: bool, fail_ranking: bool) -> Self {
        Self {
            urgent,
            fail_ranking,
            panic_ranking: false,
            summary: None,
            rank_calls: AtomicUsize::new(0),
            summarize_calls: AtomicUsize::new(0),
        }
    }

    /// Ranks "Urgent" on top for every text.
    pub fn urgent() -> Self {
        Self::build(true, false)
    }

    /// Ranks "Not urgent" on top for every text.
    pub fn calm() -> Self {
        Self::build(false, false)
    }

    /// Every ranking call fails.
    pub fn failing() -> Self {
        Self::build(false, true)
    }

    /// Every ranking call panics, which drives the request-task crash path.
    pub fn panicking() -> Self {
        let mut backend = Self::build(false, false);
        backend.panic_ranking = true;
        backend
    }

    /// Fixed summarizer output. Without this, summarize calls fail, which
    /// exercises the truncation fallback.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn rank_calls(&self) -> usize {
        self.rank_calls.load(Ordering::SeqCst)
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    fn backend_name(&self) -> String {
        "scripted".to_string()
    }

    async fn rank_labels(
        &self,
        _text: &str,
        candidate_labels: &[&str],
    ) -> InferenceResult<Vec<ScoredLabel>> {
        self.rank_calls.fetch_add(1, Ordering::SeqCst);

        if self.panic_ranking {
            panic!("scripted ranking panic");
        }

        if self.fail_ranking {
            return Err(InferenceError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }

        let preferred = if self.urgent { "Urgent" } else { "Not urgent" };
        let mut ranked: Vec<ScoredLabel> = candidate_labels
            .iter()
            .map(|label| ScoredLabel {
                label: label.to_string(),
                score: if *label == preferred { 0.9 } else { 0.1 },
            })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    async fn summarize(&self, _text: &str, _params: &SummaryParams) -> InferenceResult<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        match &self.summary {
            Some(summary) => Ok(summary.clone()),
            None => Err(InferenceError::NotReady("scripted summarizer".to_string())),
        }
    }
}
