//! Trait seams for the three external generative services.
//!
//! The builder only ever sees these traits; production code wires in the
//! OpenAI-backed implementations from `ladle-interaction`, tests substitute
//! in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Generates free text from a prompt, bounded by a token budget.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Transcribes a recorded audio payload to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Generates an image from a prompt, returned as raw bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// The bundle of generative services a builder session needs.
#[derive(Clone)]
pub struct GenerativeServices {
    pub text: Arc<dyn TextGenerator>,
    pub transcriber: Arc<dyn Transcriber>,
    pub image: Arc<dyn ImageGenerator>,
}

impl GenerativeServices {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        transcriber: Arc<dyn Transcriber>,
        image: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            text,
            transcriber,
            image,
        }
    }
}
