//! Chat-completions backed [`Translator`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{TranslateError, Translator};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_API_URL: &str = "https://api.deepseek.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Sampling temperature for translations.
const TEMPERATURE: f32 = 1.0;

/// Connection settings for [`ChatTranslator`].
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl TranslatorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Read `TRANSLATE_API_KEY` (required), `TRANSLATE_API_URL` and
    /// `TRANSLATE_MODEL` (optional).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("TRANSLATE_API_KEY").ok()?;
        Some(Self {
            api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key,
            model: std::env::var("TRANSLATE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Instruction sent as the system message.
fn system_prompt(target_language: &str) -> String {
    format!(
        "Translate the following text into {target_language} while preserving the original \
         meaning and context.\nTranslate it like a native speaker would, ensuring that the \
         translation is natural and fluent.\nIn the result write only the translated text \
         without any additional comments or explanations."
    )
}

/// First choice's text, trimmed. Blank output counts as no content.
fn first_content(response: ChatResponse) -> Result<String, TranslateError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(TranslateError::EmptyResponse)
}

/// HTTP client for an OpenAI-compatible chat API.
pub struct ChatTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl ChatTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: TranslatorConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let system = system_prompt(target_language);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Translation request rejected");
            return Err(TranslateError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<ChatResponse>().await?;
        let translated = first_content(parsed)?;
        tracing::debug!(
            target_language,
            chars_in = text.len(),
            chars_out = translated.len(),
            "Translated text"
        );
        Ok(translated)
    }
}
