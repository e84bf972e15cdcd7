use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Only this many characters of the input reach the prompt.
pub const MAX_PROMPT_CHARS: usize = 1000;

pub const NO_TEXT_LABEL: &str = "Unable to analyze (no text available)";
pub const ANALYSIS_ERROR_PREFIX: &str = "Analysis error: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasClass {
    Conservative,
    Liberal,
    Neutral,
}

impl BiasClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasClass::Conservative => "conservative",
            BiasClass::Liberal => "liberal",
            BiasClass::Neutral => "neutral",
        }
    }
}

impl fmt::Display for BiasClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiasAnalysis {
    /// Free-text reply from the model, or a fallback message
    pub label: String,
    pub class: BiasClass,
}

impl BiasAnalysis {
    fn neutral(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: BiasClass::Neutral,
        }
    }
}

/// Bucket a free-text reply. "conservative" wins over "liberal"; anything
/// else is neutral.
pub fn classify_reply(reply: &str) -> BiasClass {
    let lower = reply.to_lowercase();
    if lower.contains("conservative") {
        BiasClass::Conservative
    } else if lower.contains("liberal") {
        BiasClass::Liberal
    } else {
        BiasClass::Neutral
    }
}

pub fn build_prompt(text: &str) -> String {
    let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    format!(
        "Analyze this news summary for political bias in the US context.\n\
         Classify as Conservative, Liberal, or Neutral.\n\
         Give a short 1-sentence reason.\n\
         \n\
         Summary:\n\
         {excerpt}\n\
         \n\
         Answer only with the classification and reason:"
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
pub struct BiasClassifier {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key_env: String,
    api_key: Option<String>,
}

impl fmt::Debug for BiasClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiasClassifier")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BiasClassifier {
    pub fn new(client: Client, llm: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", llm.base_url.trim_end_matches('/')),
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            api_key_env: llm.api_key_env.clone(),
            api_key,
        }
    }

    /// Send one user message and return the trimmed content of the first choice.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::MissingApiKey(self.api_key_env.clone()))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LlmStatus { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(Error::EmptyCompletion)
    }

    /// Classify `text`. Never fails: remote errors become a neutral
    /// analysis whose label carries the error message.
    pub async fn analyze(&self, text: &str) -> BiasAnalysis {
        if text.is_empty() {
            return BiasAnalysis::neutral(NO_TEXT_LABEL);
        }

        match self.complete(&build_prompt(text)).await {
            Ok(reply) => {
                let class = classify_reply(&reply);
                debug!("Model replied '{}' ({})", reply, class);
                BiasAnalysis { label: reply, class }
            }
            Err(e) => {
                error!("Bias analysis failed: {}", e);
                BiasAnalysis::neutral(format!("{ANALYSIS_ERROR_PREFIX}{e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod classify_reply_tests {
        use super::*;

        #[test]
        fn test_conservative() {
            assert_eq!(
                classify_reply("Conservative - emphasizes border security."),
                BiasClass::Conservative
            );
        }

        #[test]
        fn test_liberal() {
            assert_eq!(
                classify_reply("Liberal: frames the policy around social equity."),
                BiasClass::Liberal
            );
        }

        #[test]
        fn test_case_insensitive() {
            assert_eq!(classify_reply("CONSERVATIVE"), BiasClass::Conservative);
            assert_eq!(classify_reply("lIbErAl"), BiasClass::Liberal);
        }

        #[test]
        fn test_conservative_takes_precedence() {
            assert_eq!(
                classify_reply("Liberal framing, though it quotes conservative critics."),
                BiasClass::Conservative
            );
        }

        #[test]
        fn test_keyword_inside_other_words() {
            assert_eq!(classify_reply("Neoliberalism is discussed."), BiasClass::Liberal);
        }

        #[test]
        fn test_neutral_default() {
            assert_eq!(
                classify_reply("Neutral - factual reporting of the vote."),
                BiasClass::Neutral
            );
            assert_eq!(classify_reply(""), BiasClass::Neutral);
            assert_eq!(classify_reply("No clear lean."), BiasClass::Neutral);
        }
    }

    mod prompt_tests {
        use super::*;

        #[test]
        fn test_prompt_layout() {
            let prompt = build_prompt("Congress passed the budget.");
            assert_eq!(
                prompt,
                "Analyze this news summary for political bias in the US context.\n\
                 Classify as Conservative, Liberal, or Neutral.\n\
                 Give a short 1-sentence reason.\n\
                 \n\
                 Summary:\n\
                 Congress passed the budget.\n\
                 \n\
                 Answer only with the classification and reason:"
            );
        }

        #[test]
        fn test_prompt_truncates_to_char_limit() {
            let text = "é".repeat(MAX_PROMPT_CHARS + 50);
            let prompt = build_prompt(&text);

            assert!(prompt.contains(&"é".repeat(MAX_PROMPT_CHARS)));
            assert!(!prompt.contains(&"é".repeat(MAX_PROMPT_CHARS + 1)));
        }
    }

    #[test]
    fn test_bias_class_as_str() {
        assert_eq!(BiasClass::Conservative.as_str(), "conservative");
        assert_eq!(BiasClass::Liberal.as_str(), "liberal");
        assert_eq!(BiasClass::Neutral.to_string(), "neutral");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let classifier = BiasClassifier::new(
            Client::new(),
            &LlmConfig::default(),
            Some("super-secret".to_string()),
        );
        let debug = format!("{:?}", classifier);

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("https://api.x.ai/v1/chat/completions"));
    }

    #[tokio::test]
    async fn test_empty_text_skips_remote_call() {
        let llm = LlmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..LlmConfig::default()
        };
        let classifier = BiasClassifier::new(Client::new(), &llm, Some("key".to_string()));

        let analysis = classifier.analyze("").await;
        assert_eq!(analysis.label, NO_TEXT_LABEL);
        assert_eq!(analysis.class, BiasClass::Neutral);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let classifier = BiasClassifier::new(Client::new(), &LlmConfig::default(), None);

        let analysis = classifier.analyze("Some headline").await;
        assert_eq!(analysis.class, BiasClass::Neutral);
        assert_eq!(analysis.label, "Analysis error: XAI_API_KEY is not set");
    }
}
