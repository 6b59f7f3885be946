//! Text generation through an OpenAI-compatible chat completions endpoint.

use std::future::Future;
use std::time::Duration;

use revpost_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::WriterError;

/// A model that turns a system prompt and a user prompt into text.
pub trait ContentGenerator: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, WriterError>> + Send;
}

/// Client for `POST {base}/chat/completions` (`OpenAI`, Ollama's `/v1`, vLLM, ...).
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    stream: bool,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        temperature: f32,
    ) -> Result<Self, WriterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
            temperature,
        })
    }

    /// # Errors
    ///
    /// See [`ChatCompletionsClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, WriterError> {
        Self::new(
            &config.llm_base_url,
            &config.llm_model,
            config.llm_api_key.clone(),
            config.llm_timeout_secs,
            config.llm_temperature,
        )
    }
}

impl ContentGenerator for ChatCompletionsClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, WriterError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            stream: false,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(WriterError::Llm(format!(
                "chat completions returned status {status}: {snippet}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| WriterError::Llm(format!("chat completions response parse error: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(WriterError::Llm(
                "chat completions returned no content".to_string(),
            ));
        }
        Ok(content)
    }
}
