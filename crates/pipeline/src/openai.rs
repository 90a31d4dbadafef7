//! OpenAI-compatible HTTP clients for chat completions and image generation.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::OpenAiConfig;
use crate::error::GeneratorError;
use crate::generator::{ImageGenerator, SpeechGenerator, TextGenerator};

/// Shared HTTP plumbing for one OpenAI-compatible endpoint.
#[derive(Clone)]
struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    fn new(config: &OpenAiConfig) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn send(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, GeneratorError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, GeneratorError> {
        Ok(self.send(path, body).await?.json::<T>().await?)
    }

    async fn post_bytes(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<u8>, GeneratorError> {
        Ok(self.send(path, body).await?.bytes().await?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat completions client. The system role passed to [`ask`](TextGenerator::ask)
/// overrides the default one.
#[derive(Clone)]
pub struct OpenAiChat {
    api: ApiClient,
    model: String,
    default_role: Option<String>,
}

impl OpenAiChat {
    pub fn new(config: &OpenAiConfig) -> Result<Self, GeneratorError> {
        Ok(Self {
            api: ApiClient::new(config)?,
            model: config.chat_model.clone(),
            default_role: None,
        })
    }

    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = Some(role.into());
        self
    }
}

/// Build the chat `messages` array, system role first.
fn chat_messages(prompt: &str, role: Option<&str>) -> serde_json::Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(role) = role {
        messages.push(json!({"role": "system", "content": role}));
    }
    messages.push(json!({"role": "user", "content": prompt}));
    serde_json::Value::Array(messages)
}

#[async_trait]
impl TextGenerator for OpenAiChat {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn ask(&self, prompt: &str, role: Option<&str>) -> Result<String, GeneratorError> {
        if prompt.is_empty() {
            return Err(GeneratorError::EmptyPrompt);
        }

        let role = role.or(self.default_role.as_deref());
        let body = json!({
            "model": self.model,
            "messages": chat_messages(prompt, role),
        });

        let response: ChatResponse = self.api.post_json("/chat/completions", &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GeneratorError::Malformed("response has no choices".into()))?
            .message
            .content
            .unwrap_or_default();

        debug!(reply_len = content.len(), "Chat completion received");
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

/// Image generation client returning decoded PNG bytes.
#[derive(Clone)]
pub struct OpenAiImages {
    api: ApiClient,
    model: String,
    size: String,
    count: u8,
}

impl OpenAiImages {
    pub fn new(config: &OpenAiConfig) -> Result<Self, GeneratorError> {
        Ok(Self {
            api: ApiClient::new(config)?,
            model: config.image_model.clone(),
            size: config.image_size.clone(),
            count: 1,
        })
    }

    /// Number of images requested per prompt.
    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count.max(1);
        self
    }
}

fn decode_images(response: ImagesResponse) -> Result<Vec<Vec<u8>>, GeneratorError> {
    response
        .data
        .into_iter()
        .map(|datum| {
            let encoded = datum
                .b64_json
                .ok_or_else(|| GeneratorError::Malformed("image without b64_json".into()))?;
            BASE64
                .decode(encoded)
                .map_err(|e| GeneratorError::Malformed(format!("invalid base64 image: {e}")))
        })
        .collect()
}

#[async_trait]
impl ImageGenerator for OpenAiImages {
    #[instrument(skip_all, fields(model = %self.model, size = %self.size))]
    async fn generate(&self, prompt: &str) -> Result<Vec<Vec<u8>>, GeneratorError> {
        if prompt.is_empty() {
            return Err(GeneratorError::EmptyPrompt);
        }

        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "size": self.size,
            "n": self.count,
            "output_format": "png",
        });

        let response: ImagesResponse = self.api.post_json("/images/generations", &body).await?;
        let images = decode_images(response)?;
        debug!(count = images.len(), "Images received");
        Ok(images)
    }
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// Text-to-speech client returning WAV audio.
#[derive(Clone)]
pub struct OpenAiSpeech {
    api: ApiClient,
    model: String,
    voice: String,
}

impl OpenAiSpeech {
    pub fn new(config: &OpenAiConfig) -> Result<Self, GeneratorError> {
        Ok(Self {
            api: ApiClient::new(config)?,
            model: config.speech_model.clone(),
            voice: config.speech_voice.clone(),
        })
    }
}

#[async_trait]
impl SpeechGenerator for OpenAiSpeech {
    #[instrument(skip_all, fields(model = %self.model, voice = %self.voice, text_len = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GeneratorError> {
        if text.is_empty() {
            return Err(GeneratorError::EmptyPrompt);
        }

        let body = json!({
            "model": self.model,
            "voice": self.voice,
            "input": text,
            "response_format": "wav",
        });

        let audio = self.api.post_bytes("/audio/speech", &body).await?;
        if audio.is_empty() {
            return Err(GeneratorError::Malformed("empty audio response".into()));
        }
        debug!(size_bytes = audio.len(), "Speech received");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> OpenAiConfig {
        OpenAiConfig {
            api_key: "sk-test".into(),
            base_url: "http://127.0.0.1:9".into(),
            chat_model: "gpt-5-nano".into(),
            image_model: "gpt-image-1".into(),
            image_size: "1024x1024".into(),
            speech_model: "gpt-4o-mini-tts".into(),
            speech_voice: "alloy".into(),
            request_timeout_secs: 1,
        }
    }

    #[test]
    fn system_role_comes_first() {
        let messages = chat_messages("hi", Some("be brief"));
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1], json!({"role": "user", "content": "hi"}));
        assert_eq!(chat_messages("hi", None).as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_any_request() {
        let chat = OpenAiChat::new(&config()).unwrap();
        assert_matches!(chat.ask("", None).await, Err(GeneratorError::EmptyPrompt));

        let images = OpenAiImages::new(&config()).unwrap();
        assert_matches!(images.generate("").await, Err(GeneratorError::EmptyPrompt));

        let speech = OpenAiSpeech::new(&config()).unwrap();
        assert_matches!(speech.synthesize("").await, Err(GeneratorError::EmptyPrompt));
    }

    #[test]
    fn image_payloads_are_decoded() {
        let response: ImagesResponse = serde_json::from_value(json!({
            "data": [{"b64_json": BASE64.encode(b"\x89PNG")}]
        }))
        .unwrap();
        assert_eq!(decode_images(response).unwrap(), vec![b"\x89PNG".to_vec()]);
    }

    #[test]
    fn missing_image_payload_is_malformed() {
        let response: ImagesResponse =
            serde_json::from_value(json!({"data": [{"url": "http://x"}]})).unwrap();
        assert_matches!(decode_images(response), Err(GeneratorError::Malformed(_)));
    }

    #[test]
    fn chat_content_may_be_null() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
