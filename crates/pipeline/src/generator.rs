//! Large-model collaborators: text, image and speech generation.
//!
//! Only the narrow contracts the pipeline relies on are defined here;
//! [`openai`](crate::openai) provides HTTP implementations of all three.

use async_trait::async_trait;

use crate::error::GeneratorError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` with an optional system `role` and return the raw reply.
    async fn ask(&self, prompt: &str, role: Option<&str>) -> Result<String, GeneratorError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one or more encoded images for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Vec<Vec<u8>>, GeneratorError>;
}

#[async_trait]
pub trait SpeechGenerator: Send + Sync {
    /// Synthesize `text` into an encoded audio clip (WAV).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GeneratorError>;
}
