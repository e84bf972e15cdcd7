use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the outbound stages: feed fetch, article download, LLM call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse feed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("LLM API error {status}: {body}")]
    LlmStatus { status: StatusCode, body: String },

    #[error("LLM response has no content")]
    EmptyCompletion,

    #[error("{0} is not set")]
    MissingApiKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
