use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use tracing::info;

use crate::config::FeedConfig;
use crate::error::Result;

/// One entry taken from the top of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub link: String,
    pub source: String,
    /// Entry summary, or the title when the feed has none
    pub description: String,
    pub published: Option<DateTime<Utc>>,
}

pub struct HeadlineSource {
    client: Client,
    feed: FeedConfig,
}

impl HeadlineSource {
    pub fn new(client: Client, feed: FeedConfig) -> Self {
        Self { client, feed }
    }

    pub async fn fetch_top_headlines(&self) -> Result<Vec<Headline>> {
        info!("Fetching feed: {} ({})", self.feed.name, self.feed.url);

        let response = self
            .client
            .get(&self.feed.url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        let headlines = parse_headlines(&bytes, &self.feed.name, self.feed.limit)?;
        info!("Took {} headlines from '{}'", headlines.len(), self.feed.name);
        Ok(headlines)
    }
}

/// Parse a feed document and keep the first `limit` entries in feed order.
pub fn parse_headlines(xml_bytes: &[u8], source: &str, limit: usize) -> Result<Vec<Headline>> {
    let parsed = parser::parse(xml_bytes)?;

    let headlines = parsed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| {
            let title = entry.title.as_ref().map(|t| t.content.trim().to_string());

            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_else(|| "#".to_string());

            let description = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .or_else(|| title.clone())
                .unwrap_or_default();

            let published: Option<DateTime<Utc>> =
                entry.published.or(entry.updated).map(|dt| dt.into());

            Headline {
                title: title.unwrap_or_else(|| "Untitled".to_string()),
                link,
                source: source.to_string(),
                description,
                published,
            }
        })
        .collect();

    Ok(headlines)
}
