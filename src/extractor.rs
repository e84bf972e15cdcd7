use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::Result;

pub const PLACEHOLDER_TITLE: &str = "Custom Article";
pub const SENTINEL_TEXT: &str = "No text available for this URL - bias analysis limited.";

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub title: String,
    pub text: String,
}

pub struct Extractor {
    client: Client,
}

impl Extractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedArticle> {
        info!("Downloading article: {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;

        Ok(parse_article(&html))
    }

    /// Like [`Extractor::extract`], but a failed download yields the
    /// placeholder title and sentinel text instead of an error.
    pub async fn extract_or_sentinel(&self, url: &str) -> ExtractedArticle {
        match self.extract(url).await {
            Ok(article) => article,
            Err(e) => {
                warn!("Failed to extract article '{}': {}", url, e);
                ExtractedArticle {
                    title: PLACEHOLDER_TITLE.to_string(),
                    text: SENTINEL_TEXT.to_string(),
                }
            }
        }
    }
}

/// Pull a title and the main paragraph text out of an HTML page.
pub fn parse_article(html: &str) -> ExtractedArticle {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "meta[property='og:title']")
        .or_else(|| element_text(&document, "title"))
        .or_else(|| element_text(&document, "h1"))
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());

    let mut paragraphs = collect_paragraphs(&document, "article p");
    if paragraphs.is_empty() {
        paragraphs = collect_paragraphs(&document, "p");
    }

    let mut text = paragraphs.join("\n\n");
    if text.is_empty() {
        text = meta_content(&document, "meta[name='description']")
            .or_else(|| meta_content(&document, "meta[property='og:description']"))
            .unwrap_or_default();
    }

    ExtractedArticle { title, text }
}

fn collect_paragraphs(document: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|p| !p.is_empty())
        .collect()
}

fn element_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
