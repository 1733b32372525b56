//! Chat completion client for OpenAI-compatible (Azure) deployments.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docflow_core::error::LlmError;
use docflow_core::models::config::LlmConfig;
use docflow_core::pipeline::CompletionClient;

pub struct ChatClient {
    url: String,
    api_key: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl ChatClient {
    /// Build a client from config, reading the key from `api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.endpoint.trim().is_empty() || config.deployment.trim().is_empty() {
            return Err(LlmError::NotConfigured(
                "llm.endpoint and llm.deployment must be set".to_string(),
            ));
        }
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::NotConfigured(format!("{} is not set", config.api_key_env)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        Ok(Self {
            url: chat_url(config),
            api_key,
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }
}

fn chat_url(config: &LlmConfig) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        config.endpoint.trim_end_matches('/'),
        config.deployment,
        config.api_version
    )
}

impl CompletionClient for ChatClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!("requesting completion ({} prompt chars)", prompt.len());
        let resp = self
            .client
            .post(&self.url)
            .header("api-key", self.api_key.trim())
            .json(&body)
            .send()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().map_err(|e| LlmError::Request(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::Empty)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
