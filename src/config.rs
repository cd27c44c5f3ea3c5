use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{RegwatchError, Result};

/// Watched feed endpoints. The service ships with a telecom-heavy default
/// list so it is useful with no configuration file at all.
fn default_feeds() -> Vec<String> {
    [
        "https://www.totaltele.com/rss/news",
        "https://www.telecomtv.com/feed/",
        "https://www.telegeography.com/rss/press-releases/",
        "https://www.lightreading.com/rss_simple.asp",
        "https://www.rcrwireless.com/rss/all",
        "https://www.ncc.gov.ng/media-centre/press-releases/rss.xml",
        "https://nitda.gov.ng/feed/",
        "https://fmcide.gov.ng/news/feed/",
        "https://www.cbn.gov.ng/News/RssFeed.xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// HTTP listener configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Feed fetching configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
    /// Feeds fetched in flight at once during a digest run.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "regwatch/0.1".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_redirects: 5,
            concurrency: 4,
        }
    }
}

/// Inference backend configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Backend selector: "hosted" calls a hosted inference API, "canned"
    /// runs a deterministic in-process stand-in.
    pub backend: String,
    pub api_url: String,
    /// Name of the environment variable holding the API token. The token
    /// itself never appears in the configuration file.
    pub api_token_env: String,
    pub classifier_model: String,
    pub summarizer_model: String,
    pub timeout_seconds: u64,
    /// Articles assessed in flight at once during a digest run.
    pub concurrency: usize,
    pub max_summary_length: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: "hosted".to_string(),
            api_url: "https://api-inference.huggingface.co".to_string(),
            api_token_env: "HF_API_TOKEN".to_string(),
            classifier_model: "typeform/distilbert-base-uncased-mnli".to_string(),
            summarizer_model: "sshleifer/distilbart-cnn-6-6".to_string(),
            timeout_seconds: 30,
            concurrency: 2,
            max_summary_length: 150,
        }
    }
}

/// Top-level application configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feeds: Vec<String>,
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub inference: InferenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            server: ServerConfig::default(),
            fetch: FetchConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, or fall back to the built-in
    /// defaults when no path is given.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&data)
            .map_err(|e| RegwatchError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }
}
