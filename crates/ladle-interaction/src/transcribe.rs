//! Speech transcription via the OpenAI audio API.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use ladle_core::generate::Transcriber;
use ladle_core::{LadleError, Result};

use crate::config::OpenAiConfig;

/// What an inaudible recording transcribes to. When the model hears
/// nothing it tends to emit stray non-ASCII glyphs; those are collapsed to
/// this message so the builder treats them as ordinary unmatched input.
const SILENCE_MESSAGE: &str = "No ingredients specified or ingredients not recognized.";

/// [`Transcriber`] backed by the OpenAI audio transcription endpoint.
#[derive(Clone)]
pub struct WhisperTranscriber {
    client: Client,
    config: OpenAiConfig,
}

impl WhisperTranscriber {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let form = Form::new()
            .text("model", self.config.transcribe_model.clone())
            .part(
                "file",
                Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|err| LadleError::transcription(format!("bad mime type: {err}")))?,
            );

        let response = self
            .client
            .post(self.config.endpoint("audio/transcriptions"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                LadleError::transcription(format!("transcription request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body_text, "transcription request rejected");
            return Err(LadleError::transcription(format!(
                "transcription request returned {status}"
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|err| {
            LadleError::transcription(format!("malformed transcription response: {err}"))
        })?;

        Ok(sanitize_transcription(parsed.text))
    }
}

/// Collapses transcriptions containing non-ASCII glyphs to the silence
/// message.
fn sanitize_transcription(text: String) -> String {
    if text.chars().any(|c| (c as u32) > 127) {
        return SILENCE_MESSAGE.to_string();
    }
    text
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_transcription_passes_through() {
        let text = "I have eggs, cheese, and bread.".to_string();
        assert_eq!(sanitize_transcription(text.clone()), text);
    }

    #[test]
    fn test_non_ascii_collapses_to_silence_message() {
        assert_eq!(
            sanitize_transcription("…♪ ♪ ♪".to_string()),
            SILENCE_MESSAGE
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text":"breakfast please"}"#).unwrap();
        assert_eq!(parsed.text, "breakfast please");
    }
}
