//! Environment-driven configuration for the OpenAI services.

use std::env;

use ladle_core::{LadleError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo-instruct";
const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";

/// Shared configuration for all three OpenAI-backed services.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub transcribe_model: String,
    pub image_model: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            transcribe_model: DEFAULT_TRANSCRIBE_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `OPENAI_API_KEY` is required; model names and the base URL fall back
    /// to defaults (`OPENAI_TEXT_MODEL`, `OPENAI_TRANSCRIBE_MODEL`,
    /// `OPENAI_IMAGE_MODEL`, `OPENAI_BASE_URL`).
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            LadleError::config("OPENAI_API_KEY not found in environment variables")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("OPENAI_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(model) = env::var("OPENAI_TRANSCRIBE_MODEL") {
            config.transcribe_model = model;
        }
        if let Ok(model) = env::var("OPENAI_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
