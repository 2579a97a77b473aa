//! Language Model Access
//!
//! Builds the farm-assistant prompt around the latest sensor readings and sends
//! it to a remote text-generation model. `generate` never fails: every
//! transport or payload problem turns into a fixed Hindi apology.

use crate::sensor::{SensorSnapshot, format_reading};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const APOLOGY_NOT_UNDERSTOOD: &str = "माफ़ करें, मुझे समझ नहीं आया।";
const APOLOGY_SOMETHING_WRONG: &str = "माफ़ करें, कुछ गड़बड़ हो गई। फिर से कोशिश करें।";
const APOLOGY_UNAVAILABLE: &str = "माफ़ करें, AI सेवा अभी उपलब्ध नहीं है।";

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// When false, only the continuation is returned, not the prompt.
    pub return_full_text: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            temperature: 0.7,
            return_full_text: false,
        }
    }
}

/// Errors from a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model provider error: {0}")]
    Provider(#[from] OpenAIError),
    #[error("model response carried no generated text")]
    MissingText,
    #[error("unexpected model payload: {0}")]
    UnexpectedPayload(String),
}

impl ModelError {
    /// The reply shown to the user in place of a generated answer.
    pub fn apology(&self) -> &'static str {
        match self {
            ModelError::MissingText => APOLOGY_NOT_UNDERSTOOD,
            ModelError::UnexpectedPayload(_) => APOLOGY_SOMETHING_WRONG,
            ModelError::Transport(_) | ModelError::Provider(_) => APOLOGY_UNAVAILABLE,
        }
    }
}

/// A generic client for a remote text-generation model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends a fully built prompt and returns the generated continuation.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Builds the prompt, calls the model and falls back to an apology on failure.
pub async fn generate(
    model: &dyn LanguageModel,
    system_prompt: &str,
    snapshot: Option<&SensorSnapshot>,
    user_message: &str,
) -> String {
    let prompt = build_prompt(system_prompt, snapshot, user_message);
    match model.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Language model call failed; replying with apology");
            e.apology().to_string()
        }
    }
}

/// Concatenates the system prompt, the sensor context and the user's turn.
pub fn build_prompt(
    system_prompt: &str,
    snapshot: Option<&SensorSnapshot>,
    user_message: &str,
) -> String {
    let mut prompt = system_prompt.to_string();

    if let Some(s) = snapshot {
        prompt.push_str("\n\nवर्तमान सेंसर डेटा:\n");
        prompt.push_str(&format!("तापमान: {}°C\n", format_reading(s.temperature)));
        prompt.push_str(&format!("नमी: {}%\n", format_reading(s.humidity)));
        prompt.push_str(&format!("मिट्टी: {}\n", s.soil_moisture));
        prompt.push_str(&format!("गैस: {}\n", s.gas_level));
        prompt.push_str(&format!("बारिश: {}\n", s.rain_level));
        prompt.push_str(&format!("मोटर: {}\n", s.motor_label()));
    }

    format!("{prompt}\n\nउपयोगकर्ता: {user_message}\nसहायक:")
}

/// Connection settings for the Hugging Face inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_url: String,
    pub api_token: Option<String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParams,
}

/// An implementation of `LanguageModel` for the Hugging Face inference API.
pub struct HuggingFaceClient {
    http: reqwest::Client,
    config: HuggingFaceConfig,
    params: GenerationParams,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig, params: GenerationParams) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            params,
        }
    }
}

#[async_trait]
impl LanguageModel for HuggingFaceClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let mut request = self.http.post(&self.config.api_url).json(&InferenceRequest {
            inputs: prompt,
            parameters: self.params,
        });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let body: Value = request.send().await?.json().await?;
        debug!(response = %body, "Inference API answered");
        parse_inference_response(body)
    }
}

/// Extracts the continuation from an inference API body.
///
/// The API answers with a list of generations; anything else (such as the
/// `{"error": ...}` object returned while a model is loading) is unexpected.
fn parse_inference_response(body: Value) -> Result<String, ModelError> {
    match body {
        Value::Array(generations) if !generations.is_empty() => generations[0]
            .get("generated_text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ModelError::MissingText),
        other => Err(ModelError::UnexpectedPayload(other.to_string())),
    }
}

/// An implementation of `LanguageModel` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    params: GenerationParams,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL for the service.
    /// * `model` - Chat model identifier (e.g., "gpt-4o-mini").
    /// * `params` - Token and sampling limits applied to every completion.
    pub fn new(config: OpenAIConfig, model: String, params: GenerationParams) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            params,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAICompatibleClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_completion_tokens(self.params.max_new_tokens)
            .temperature(self.params.temperature)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(ModelError::MissingText)
    }
}
