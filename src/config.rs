use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Timeout for every outbound request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Shown as the source of every headline
    #[serde(default = "default_feed_name")]
    pub name: String,
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Number of entries taken from the top of the feed
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

fn default_feed_name() -> String {
    "BBC News".to_string()
}

fn default_feed_url() -> String {
    "http://feeds.bbci.co.uk/news/world/us_and_canada/rss.xml".to_string()
}

fn default_feed_limit() -> usize {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: default_feed_name(),
            url: default_feed_url(),
            limit: default_feed_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible API root; `/chat/completions` is appended
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_llm_base_url() -> String {
    "https://api.x.ai/v1".to_string()
}

fn default_llm_model() -> String {
    "grok-3".to_string()
}

fn default_llm_max_tokens() -> u32 {
    100
}

fn default_api_key_env() -> String {
    "XAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    /// An empty value counts as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout(),
            feed: FeedConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
