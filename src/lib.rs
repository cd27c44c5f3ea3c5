pub mod classify;
pub mod config;
pub mod fetcher;
pub mod filter;
pub mod inference;
pub mod parser;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod types;

pub use classify::Classifier;
pub use config::AppConfig;
pub use fetcher::Fetcher;
pub use inference::{CannedBackend, HostedBackend, InferenceBackend, ModelHandle};
pub use pipeline::Pipeline;
pub use server::AppState;
pub use summarize::Summarizer;
pub use types::{IssueRecord, RawArticle, RegwatchError, Result};
