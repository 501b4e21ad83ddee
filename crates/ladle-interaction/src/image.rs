//! Recipe illustration via the OpenAI image generation API.
//!
//! The API returns a URL for the generated image; the bytes are downloaded
//! here so the rest of the system only ever deals with an opaque payload.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ladle_core::generate::ImageGenerator;
use ladle_core::{LadleError, Result};

use crate::config::OpenAiConfig;

const IMAGE_SIZE: &str = "256x256";

/// [`ImageGenerator`] backed by the OpenAI image generation endpoint.
#[derive(Clone)]
pub struct OpenAiImageGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiImageGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let body = ImageRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        let response = self
            .client
            .post(self.config.endpoint("images/generations"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| LadleError::generation(format!("image request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body_text, "image request rejected");
            return Err(LadleError::generation(format!(
                "image request returned {status}"
            )));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|err| LadleError::generation(format!("malformed image response: {err}")))?;

        let url = parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.url)
            .ok_or_else(|| LadleError::generation("image response had no data entries"))?;

        let image = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| LadleError::generation(format!("image download failed: {err}")))?
            .bytes()
            .await
            .map_err(|err| LadleError::generation(format!("image download failed: {err}")))?;

        Ok(image.to_vec())
    }
}

#[derive(Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageEntry>,
}

#[derive(Deserialize)]
struct ImageEntry {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ImageRequest {
            model: "dall-e-2".to_string(),
            prompt: "French Toast".to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "dall-e-2");
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "256x256");
    }

    #[test]
    fn test_response_parsing_takes_first_url() {
        let parsed: ImageResponse = serde_json::from_str(
            r#"{"data":[{"url":"https://img.example/1.png"},{"url":"https://img.example/2.png"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.data[0].url, "https://img.example/1.png");
    }
}
