//! Recipe text generation via the OpenAI completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ladle_core::generate::TextGenerator;
use ladle_core::{LadleError, Result};

use crate::config::OpenAiConfig;

/// [`TextGenerator`] backed by the OpenAI completions endpoint.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTextGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate_text(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = CompletionRequest {
            model: self.config.text_model.clone(),
            prompt: prompt.to_string(),
            max_tokens,
            temperature: 1.0,
        };

        let response = self
            .client
            .post(self.config.endpoint("completions"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| LadleError::generation(format!("completion request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body_text, "completion request rejected");
            return Err(LadleError::generation(format!(
                "completion request returned {status}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| LadleError::generation(format!("malformed completion response: {err}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| LadleError::generation("completion response had no choices"))
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = CompletionRequest {
            model: "gpt-3.5-turbo-instruct".to_string(),
            prompt: "make soup".to_string(),
            max_tokens: 300,
            temperature: 1.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo-instruct");
        assert_eq!(json["max_tokens"], 300);
        assert_eq!(json["prompt"], "make soup");
    }

    #[test]
    fn test_response_parsing_takes_first_choice() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"text":"Title: Soup\nBoil water."},{"text":"ignored"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].text, "Title: Soup\nBoil water.");
    }
}
