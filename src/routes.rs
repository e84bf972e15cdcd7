use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::classifier::{BiasClass, BiasClassifier};
use crate::config::Config;
use crate::extractor::Extractor;
use crate::headlines::{Headline, HeadlineSource};

pub const USER_SOURCE: &str = "User-provided";

pub struct AppState {
    pub headlines: HeadlineSource,
    pub extractor: Extractor,
    pub classifier: BiasClassifier,
}

impl AppState {
    /// Build the state around one shared HTTP client.
    pub fn new(config: &Config, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("BiasNews/1.0 (Headline Bias Checker)")
            .build()?;

        Ok(Self {
            headlines: HeadlineSource::new(client.clone(), config.feed.clone()),
            extractor: Extractor::new(client.clone()),
            classifier: BiasClassifier::new(client, &config.llm, api_key),
        })
    }
}

/// One rendered row: a headline or the user's article with its analysis.
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub title: String,
    pub url: String,
    pub source: String,
    pub bias: String,
    pub bias_class: BiasClass,
    pub image: String,
    pub published: Option<String>,
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub articles: Vec<ArticleView>,
    pub submitted_url: String,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/bias-check", post(bias_check))
        .route("/health", get(health))
        .with_state(state)
}

/// Fetch the headlines and classify each one, in feed order.
/// A failed feed fetch renders as an empty list.
pub async fn analyze_headlines(state: &AppState) -> Vec<ArticleView> {
    let headlines = match state.headlines.fetch_top_headlines().await {
        Ok(headlines) => headlines,
        Err(e) => {
            error!("Failed to fetch headlines: {}", e);
            Vec::new()
        }
    };

    let mut articles = Vec::with_capacity(headlines.len());
    for headline in headlines {
        let analysis = state.classifier.analyze(&headline.description).await;
        articles.push(headline_view(headline, analysis.label, analysis.class));
    }
    articles
}

fn headline_view(headline: Headline, bias: String, bias_class: BiasClass) -> ArticleView {
    ArticleView {
        title: headline.title,
        url: headline.link,
        source: headline.source,
        bias,
        bias_class,
        image: String::new(),
        published: headline
            .published
            .map(|p| p.format("%b %-d, %Y %H:%M UTC").to_string()),
    }
}

/// Extract and classify a user-submitted URL.
pub async fn analyze_custom_url(state: &AppState, url: &str) -> ArticleView {
    let article = state.extractor.extract_or_sentinel(url).await;
    let analysis = state.classifier.analyze(&article.text).await;

    ArticleView {
        title: article.title,
        url: url.to_string(),
        source: USER_SOURCE.to_string(),
        bias: analysis.label,
        bias_class: analysis.class,
        image: String::new(),
        published: None,
    }
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let articles = analyze_headlines(&state).await;

    HtmlTemplate(IndexTemplate {
        articles,
        submitted_url: String::new(),
    })
}

#[derive(Deserialize)]
pub struct BiasCheckForm {
    pub url: String,
}

pub async fn bias_check(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BiasCheckForm>,
) -> impl IntoResponse {
    info!("Checking user-provided URL: {}", form.url);

    let custom = analyze_custom_url(&state, &form.url).await;

    let mut articles = analyze_headlines(&state).await;
    articles.insert(0, custom);

    HtmlTemplate(IndexTemplate {
        articles,
        submitted_url: form.url,
    })
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
