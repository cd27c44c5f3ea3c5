use std::sync::Arc;
use tracing::{debug, warn};

use crate::inference::ModelHandle;
use crate::types::ClassificationResult;

pub const URGENCY_LABELS: [&str; 2] = ["Urgent", "Not urgent"];
pub const LABEL_URGENT: &str = "Urgent";

pub const CATEGORY_LABELS: [&str; 5] = [
    "Telecom news",
    "Spectrum issue",
    "Regulation issue",
    "Financial issue",
    "Other",
];

/// Returned when no backend is available to classify with.
pub const CATEGORY_MODEL_MISSING: &str = "Unknown (Model not loaded)";
/// Returned when the backend was available but the call failed.
pub const CATEGORY_CALL_FAILED: &str = "Classification failed";

/// Zero-shot urgency and category classification.
///
/// Both entry points are infallible: every degraded state maps to a
/// conservative default (not urgent) or a sentinel category, so one flaky
/// inference call can never take down a digest run.
#[derive(Clone)]
pub struct Classifier {
    models: Arc<ModelHandle>,
}

impl Classifier {
    pub fn new(models: Arc<ModelHandle>) -> Self {
        Self { models }
    }

    /// True when the backend ranks "Urgent" above "Not urgent". Without a
    /// backend, or when the call fails, the article counts as not urgent.
    pub async fn classify_urgency(&self, text: &str) -> bool {
        let Some(backend) = self.models.backend() else {
            return false;
        };

        match backend.rank_labels(text, &URGENCY_LABELS).await {
            Ok(ranked) => ranked
                .first()
                .map(|top| top.label == LABEL_URGENT)
                .unwrap_or(false),
            Err(e) => {
                warn!("Urgency classification failed, treating as not urgent: {}", e);
                false
            }
        }
    }

    /// Best-fitting category for the text, or a sentinel naming why none
    /// could be produced. The two failure modes stay distinguishable.
    pub async fn classify_category(&self, text: &str) -> String {
        let Some(backend) = self.models.backend() else {
            return CATEGORY_MODEL_MISSING.to_string();
        };

        match backend.rank_labels(text, &CATEGORY_LABELS).await {
            Ok(ranked) => match ranked.into_iter().next() {
                Some(top) => {
                    debug!("Classified as {} ({:.3})", top.label, top.score);
                    top.label
                }
                None => CATEGORY_CALL_FAILED.to_string(),
            },
            Err(e) => {
                warn!("Category classification failed: {}", e);
                CATEGORY_CALL_FAILED.to_string()
            }
        }
    }

    /// Urgency and category in one verdict.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        ClassificationResult {
            category: self.classify_category(text).await,
            is_urgent: self.classify_urgency(text).await,
        }
    }
}
