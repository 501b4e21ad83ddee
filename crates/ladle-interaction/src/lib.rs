//! OpenAI-backed implementations of the generative-service traits.

pub mod config;
pub mod image;
pub mod text;
pub mod transcribe;

use std::sync::Arc;

use ladle_core::Result;
use ladle_core::generate::GenerativeServices;

pub use config::OpenAiConfig;
pub use image::OpenAiImageGenerator;
pub use text::OpenAiTextGenerator;
pub use transcribe::WhisperTranscriber;

/// Builds the full service bundle from environment configuration.
pub fn services_from_env() -> Result<GenerativeServices> {
    let config = OpenAiConfig::try_from_env()?;
    Ok(GenerativeServices::new(
        Arc::new(OpenAiTextGenerator::new(config.clone())),
        Arc::new(WhisperTranscriber::new(config.clone())),
        Arc::new(OpenAiImageGenerator::new(config)),
    ))
}
