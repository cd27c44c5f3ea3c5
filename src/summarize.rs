use std::sync::Arc;
use tracing::warn;

use crate::inference::{ModelHandle, SummaryParams};

/// Lower bound handed to the backend for abstractive summaries.
pub const MIN_SUMMARY_LENGTH: usize = 30;

/// Abstractive summarization with a lexical fallback.
///
/// Infallible by contract: when no backend is available or the call fails,
/// the input is truncated instead, so a digest entry always carries some
/// summary text.
#[derive(Clone)]
pub struct Summarizer {
    models: Arc<ModelHandle>,
}

impl Summarizer {
    pub fn new(models: Arc<ModelHandle>) -> Self {
        Self { models }
    }

    pub async fn summarize(&self, text: &str, max_length: usize) -> String {
        if let Some(backend) = self.models.backend() {
            let params = SummaryParams {
                max_length,
                min_length: MIN_SUMMARY_LENGTH,
                deterministic: true,
            };
            match backend.summarize(text, &params).await {
                Ok(summary) => return summary,
                Err(e) => {
                    warn!("Summarization failed, falling back to truncation: {}", e);
                }
            }
        }
        truncate_with_marker(text, max_length)
    }
}

/// Truncate to at most `max_length` characters and mark the cut with an
/// ellipsis. Text that already fits comes back unchanged, without a marker.
/// Counts characters, not bytes, so multi-byte text never splits mid-char.
pub fn truncate_with_marker(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_length).collect();
    truncated.push_str("...");
    truncated
}
