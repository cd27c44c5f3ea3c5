use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// A candidate label together with the backend's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

/// Length and determinism constraints for a summarization call.
#[derive(Debug, Clone, Copy)]
pub struct SummaryParams {
    pub max_length: usize,
    pub min_length: usize,
    /// When set, the backend must not sample; identical input gives
    /// identical output.
    pub deterministic: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Inference request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Inference API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed inference response: {0}")]
    Decode(String),

    #[error("Model {0} is not ready")]
    NotReady(String),
}

pub type InferenceResult<T> = std::result::Result<T, InferenceError>;

/// A model capability provider. Implementations stay oblivious to what the
/// labels mean; urgency and category semantics live in the callers.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Human-readable name used in logs.
    fn backend_name(&self) -> String;

    /// Rank candidate labels against the text, best first. Single-label
    /// semantics: scores compete rather than stack.
    async fn rank_labels(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> InferenceResult<Vec<ScoredLabel>>;

    /// Produce an abstractive summary within the given length bounds.
    async fn summarize(&self, text: &str, params: &SummaryParams) -> InferenceResult<String>;

    /// One-shot readiness check run at startup.
    async fn probe(&self) -> InferenceResult<()> {
        Ok(())
    }
}

/// Backend calling a hosted inference API over HTTP.
pub struct HostedBackend {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    classifier_model: String,
    summarizer_model: String,
    call_timeout: Duration,
}

impl HostedBackend {
    pub fn new(
        base_url: impl Into<String>,
        classifier_model: impl Into<String>,
        summarizer_model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_token: None,
            classifier_model: classifier_model.into(),
            summarizer_model: summarizer_model.into(),
            call_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> InferenceResult<reqwest::Response> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn request_ranking(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> InferenceResult<Vec<ScoredLabel>> {
        let url = format!("{}/models/{}", self.base_url, self.classifier_model);
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: candidate_labels.to_vec(),
                multi_label: false,
            },
        };

        let response = self.post_json(&url, &body).await?;
        let parsed: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        if parsed.labels.len() != parsed.scores.len() {
            return Err(InferenceError::Decode(format!(
                "{} labels with {} scores",
                parsed.labels.len(),
                parsed.scores.len()
            )));
        }

        let mut ranked: Vec<ScoredLabel> = parsed
            .labels
            .into_iter()
            .zip(parsed.scores)
            .map(|(label, score)| ScoredLabel { label, score })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    async fn request_summary(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> InferenceResult<String> {
        let url = format!("{}/models/{}", self.base_url, self.summarizer_model);
        let body = SummarizationRequest {
            inputs: text,
            parameters: SummarizationParameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: !params.deterministic,
            },
        };

        let response = self.post_json(&url, &body).await?;
        let parsed: Vec<SummaryChoice> = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        parsed
            .into_iter()
            .next()
            .map(|choice| choice.summary_text)
            .ok_or_else(|| InferenceError::Decode("empty summarization response".to_string()))
    }

    async fn request_probe(&self) -> InferenceResult<()> {
        let url = format!("{}/status/{}", self.base_url, self.classifier_model);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ModelStatus = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        if !parsed.loaded {
            return Err(InferenceError::NotReady(self.classifier_model.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for HostedBackend {
    fn backend_name(&self) -> String {
        format!("hosted ({})", self.base_url)
    }

    async fn rank_labels(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> InferenceResult<Vec<ScoredLabel>> {
        debug!(
            "Ranking {} labels with {}",
            candidate_labels.len(),
            self.classifier_model
        );
        match tokio::time::timeout(self.call_timeout, self.request_ranking(text, candidate_labels))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(self.call_timeout)),
        }
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> InferenceResult<String> {
        debug!(
            "Summarizing {} chars with {}",
            text.chars().count(),
            self.summarizer_model
        );
        match tokio::time::timeout(self.call_timeout, self.request_summary(text, params)).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(self.call_timeout)),
        }
    }

    async fn probe(&self) -> InferenceResult<()> {
        match tokio::time::timeout(self.call_timeout, self.request_probe()).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(self.call_timeout)),
        }
    }
}

/// Deterministic in-process backend for development and testing. Scores
/// labels from crude lexical cues and summarizes by taking the leading
/// sentences. Not a model, but close enough to exercise every caller.
pub struct CannedBackend;

const URGENT_CUES: [&str; 10] = [
    "urgent",
    "immediate",
    "deadline",
    "revoke",
    "suspend",
    "sanction",
    "shutdown",
    "outage",
    "penalty",
    "emergency",
];

impl CannedBackend {
    pub fn new() -> Self {
        Self
    }

    fn has_urgent_cue(text: &str) -> bool {
        URGENT_CUES.iter().any(|cue| text.contains(cue))
    }

    fn score_label(text: &str, label: &str) -> f64 {
        let lower = label.to_lowercase();
        if lower == "urgent" {
            return if Self::has_urgent_cue(text) { 0.9 } else { 0.1 };
        }
        if lower == "not urgent" {
            return if Self::has_urgent_cue(text) { 0.1 } else { 0.9 };
        }

        // Lexical overlap between the label's words and the text.
        let mut score: f64 = 0.1;
        for word in lower.split_whitespace() {
            if word.len() > 3 && text.contains(word) {
                score += 0.4;
            }
        }
        score.min(1.0)
    }
}

impl Default for CannedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for CannedBackend {
    fn backend_name(&self) -> String {
        "canned".to_string()
    }

    async fn rank_labels(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> InferenceResult<Vec<ScoredLabel>> {
        let lower = text.to_lowercase();
        let mut ranked: Vec<ScoredLabel> = candidate_labels
            .iter()
            .map(|label| ScoredLabel {
                label: label.to_string(),
                score: Self::score_label(&lower, label),
            })
            .collect();
        // Stable sort keeps candidate order on ties.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> InferenceResult<String> {
        let lead: String = text.split_inclusive('.').take(2).collect();
        let lead = lead.trim();
        let base: &str = if lead.is_empty() { text.trim() } else { lead };
        Ok(base.chars().take(params.max_length).collect())
    }
}

/// Outcome of the one startup attempt to ready an inference backend.
///
/// Built once in main and injected everywhere that needs model access. A
/// failed probe leaves the service running; callers see `None` from
/// [`ModelHandle::backend`] and degrade on their own terms.
pub struct ModelHandle {
    state: ModelState,
}

enum ModelState {
    Loaded(Arc<dyn InferenceBackend>),
    Unavailable { reason: String },
}

impl ModelHandle {
    /// Probe the backend once and record the outcome.
    pub async fn load(backend: Arc<dyn InferenceBackend>) -> Self {
        let name = backend.backend_name();
        match backend.probe().await {
            Ok(()) => {
                info!("Inference backend ready: {}", name);
                Self {
                    state: ModelState::Loaded(backend),
                }
            }
            Err(e) => {
                error!(
                    "Inference backend {} unavailable, running degraded: {}",
                    name, e
                );
                Self {
                    state: ModelState::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Wrap a backend without probing it.
    pub fn ready(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            state: ModelState::Loaded(backend),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    pub fn backend(&self) -> Option<&Arc<dyn InferenceBackend>> {
        match &self.state {
            ModelState::Loaded(backend) => Some(backend),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Loaded(_) => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }
}

// Hosted inference API request/response structures
#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
    multi_label: bool,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryChoice {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct ModelStatus {
    loaded: bool,
}
