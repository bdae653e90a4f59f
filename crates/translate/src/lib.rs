//! Translation client for script localisation.
//!
//! [`Translator`] is the contract callers depend on; [`ChatTranslator`]
//! implements it over an OpenAI-compatible chat-completions endpoint.

pub mod chat;

use async_trait::async_trait;

pub use chat::{ChatTranslator, TranslatorConfig};

/// Errors from the translation layer.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Translation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The API answered without any completion text.
    #[error("Translation API returned no content")]
    EmptyResponse,
}

/// Translates free text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (a language name or tag such
    /// as `"German"` or `"de"`). Returns only the translated text.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}
