use serde::{Deserialize, Serialize};

/// A single syndicated entry after field normalization.
///
/// Every field is always present: the parser substitutes placeholders for
/// anything the feed omitted, so downstream stages never deal with absent
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Publication date as free-form text, never parsed further downstream.
    pub published: String,
}

impl RawArticle {
    /// Text handed to the classifier and summarizer: title and summary
    /// joined with ". ".
    pub fn full_text(&self) -> String {
        format!("{}. {}", self.title, self.summary)
    }
}

/// Combined urgency and category verdict for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: String,
    pub is_urgent: bool,
}

/// Final output unit of a digest run, serialized as-is in API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub issue_name: String,
    pub issue_summary: String,
    pub issue_date: String,
    pub issue_source_link: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegwatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed {url} returned HTTP {status}")]
    FeedStatus { url: String, status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RegwatchError>;
