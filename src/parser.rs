use chrono::Utc;
use feed_rs::parser;
use tracing::debug;

use crate::types::{RawArticle, RegwatchError, Result};

pub const DEFAULT_TITLE: &str = "No title";
pub const DEFAULT_LINK: &str = "#";

/// Parse an RSS or Atom document into normalized articles.
///
/// Feed-level metadata is discarded; only the entries matter here. Entries
/// are kept in document order and duplicates are not collapsed, repeats
/// across feeds simply appear twice in the digest.
pub fn parse_articles(content: &str) -> Result<Vec<RawArticle>> {
    debug!("Parsing feed content ({} bytes)", content.len());

    let feed = parser::parse(content.as_bytes())
        .map_err(|e| RegwatchError::Parse(format!("Failed to parse feed: {}", e)))?;

    Ok(feed.entries.into_iter().map(article_from_entry).collect())
}

/// Normalize one entry, substituting placeholders for missing fields so the
/// result always carries a full set of values.
fn article_from_entry(entry: feed_rs::model::Entry) -> RawArticle {
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let summary = entry.summary.map(|s| s.content).unwrap_or_default();

    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_else(|| DEFAULT_LINK.to_string());

    // Publication date stays textual downstream. Entries without one get
    // the wall clock at parse time.
    let published = entry
        .published
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_else(|| Utc::now().to_string());

    RawArticle {
        title,
        summary,
        link,
        published,
    }
}
