use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    async fn chat(&self, system: &str, user: &str) -> Result<String>;
}

pub fn create_llm(config: &Config) -> Result<Box<dyn LlmClient>> {
    match config.llm.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiClient::new(
            &config.llm.api_key,
            &config.llm.model,
            config.llm.endpoint.as_deref(),
        ))),
        "azure" => {
            let endpoint = config
                .llm
                .endpoint
                .as_deref()
                .context("Azure provider requires 'endpoint' in llm config")?;
            Ok(Box::new(AzureOpenAiClient::new(
                endpoint,
                &config.llm.api_key,
                &config.llm.model,
                &config.llm.api_version,
            )))
        }
        _ => Err(anyhow!("Unknown LLM provider: {}", config.llm.provider)),
    }
}

// Both providers speak the chat-completions wire format.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

fn build_request(model: &str, system: &str, user: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user.to_string(),
            },
        ],
    }
}

fn extract_content(result: ChatResponse) -> Result<String> {
    if let Some(choice) = result.choices.first() {
        if let Some(content) = &choice.message.content {
            return Ok(content.clone());
        }
    }
    Err(anyhow!("Chat response empty or missing content"))
}

// --- OpenAI ---

#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&build_request(&self.model, system, user))
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("OpenAI API error: {}", error_text));
        }

        extract_content(resp.json().await?)
    }
}

// --- Azure OpenAI ---

#[derive(Debug)]
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: &str, api_key: &str, model: &str, api_version: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_version: api_version.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn chat_url(&self) -> String {
        // Azure routes by deployment name and authenticates via api-key header.
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.model, self.api_version
        )
    }
}

#[async_trait]
impl LlmClient for AzureOpenAiClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.chat_url())
            .header("api-key", &self.api_key)
            .json(&build_request(&self.model, system, user))
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Azure OpenAI API error: {}", error_text));
        }

        extract_content(resp.json().await?)
    }
}
