use crate::types::RawArticle;

/// Keywords that mark an article as telecom-regulatory. Matching is
/// case-insensitive substring containment, so "Telecoms" and
/// "telecommunications" both hit.
pub const KEYWORDS: [&str; 6] = [
    "telecom",
    "spectrum",
    "regulation",
    "license",
    "operator",
    "telecommunications",
];

/// True when the article's title or summary mentions any watch keyword.
/// Deterministic and purely lexical, no inference involved.
pub fn is_relevant(article: &RawArticle) -> bool {
    let text = format!("{} {}", article.title, article.summary).to_lowercase();
    KEYWORDS.iter().any(|keyword| text.contains(keyword))
}
