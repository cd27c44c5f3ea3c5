use futures::stream::{self, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::classify::Classifier;
use crate::fetcher::Fetcher;
use crate::filter;
use crate::summarize::Summarizer;
use crate::types::{IssueRecord, RawArticle};

/// Digest pipeline: fetch every feed, keep the telecom-relevant articles,
/// then assess urgency and summarize the survivors.
///
/// Two data-parallel stages, both order preserving. The first fans out over
/// feed endpoints, the second over filtered articles; within each stage
/// concurrency is bounded so a large feed list cannot stampede the network
/// or the inference API.
pub struct Pipeline {
    fetcher: Fetcher,
    classifier: Classifier,
    summarizer: Summarizer,
    inference_concurrency: usize,
    max_summary_length: usize,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, classifier: Classifier, summarizer: Summarizer) -> Self {
        Self {
            fetcher,
            classifier,
            summarizer,
            inference_concurrency: 2,
            max_summary_length: 150,
        }
    }

    pub fn with_inference_concurrency(mut self, concurrency: usize) -> Self {
        self.inference_concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_summary_length(mut self, max_length: usize) -> Self {
        self.max_summary_length = max_length;
        self
    }

    /// Run one digest pass over the given endpoints.
    ///
    /// Never fails: endpoint errors were already swallowed by the fetcher
    /// and inference errors degrade inside the classifier and summarizer.
    /// An empty result simply means nothing urgent right now.
    pub async fn run(&self, endpoints: &[String]) -> Vec<IssueRecord> {
        let run_id = Uuid::new_v4();
        info!("Digest run {} over {} endpoints", run_id, endpoints.len());

        let articles = self.fetcher.fetch_all(endpoints).await;
        let fetched = articles.len();

        let relevant: Vec<RawArticle> = articles.into_iter().filter(filter::is_relevant).collect();
        info!(
            "Run {}: {} of {} articles pass the relevance filter",
            run_id,
            relevant.len(),
            fetched
        );

        let records: Vec<IssueRecord> = stream::iter(relevant)
            .map(|article| self.assess(article))
            .buffered(self.inference_concurrency)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        info!(
            "Digest run {} complete: {} urgent of {} fetched",
            run_id,
            records.len(),
            fetched
        );
        records
    }

    /// Assess one relevant article: classify urgency over the combined
    /// title and summary text, and only summarize when it came back urgent.
    async fn assess(&self, article: RawArticle) -> Option<IssueRecord> {
        let full_text = article.full_text();

        if !self.classifier.classify_urgency(&full_text).await {
            debug!("Not urgent: {}", article.title);
            return None;
        }

        let summary = self
            .summarizer
            .summarize(&full_text, self.max_summary_length)
            .await;

        Some(IssueRecord {
            issue_name: article.title,
            issue_summary: summary,
            issue_date: article.published,
            issue_source_link: article.link,
        })
    }
}
