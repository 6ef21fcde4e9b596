use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use log::info;

use super::{ ChatClient, ChatTurn, CompletionResponse, TurnRole };
use crate::llm::{ LlmConfig, LlmType };

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize, Deserialize, Debug)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>, max_tokens: u32) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
            max_tokens,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(
            Self::new(
                config.base_url.clone(),
                config.completion_model.clone(),
                config.max_output_tokens
            )
        )
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/generate", self.base_url);
        info!("OllamaClient::complete() → model={} url={}", self.completion_model, url);
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt,
            stream: false,
            options: GenerateOptions { num_predict: self.max_tokens },
        };
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<CompletionResponse>().await?;
        Ok(data)
    }

    async fn complete_chat(
        &self,
        context: &[ChatTurn],
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/chat", self.base_url);
        info!(
            "OllamaClient::complete_chat() → model={} context_turns={}",
            self.completion_model,
            context.len()
        );
        let mut messages: Vec<OllamaMessage> = context
            .iter()
            .map(|turn| OllamaMessage {
                role: (match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "assistant",
                }).to_string(),
                content: turn.content.clone(),
            })
            .collect();
        messages.push(OllamaMessage { role: "user".to_string(), content: prompt.to_string() });

        let req = ChatRequest {
            model: &self.completion_model,
            messages,
            stream: false,
            options: GenerateOptions { num_predict: self.max_tokens },
        };
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<ChatResponse>().await?;
        Ok(CompletionResponse { response: data.message.content })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_config() {
        let config = LlmConfig::default();
        assert!(OllamaClient::from_config(&config).is_err());
    }

    #[test]
    fn applies_defaults_and_strips_trailing_slash() {
        let config = LlmConfig {
            llm_type: LlmType::Ollama,
            base_url: Some("http://ollama.local:11434/".into()),
            ..LlmConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://ollama.local:11434");
        assert_eq!(client.get_model(), "llama3");
        assert_eq!(client.max_tokens, 1000);
    }

    #[test]
    fn chat_request_serializes_roles_and_token_cap() {
        let req = ChatRequest {
            model: "llama3",
            messages: vec![OllamaMessage { role: "assistant".into(), content: "hi".into() }],
            stream: false,
            options: GenerateOptions { num_predict: 42 },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["messages"][0]["role"], "assistant");
        assert_eq!(value["options"]["num_predict"], 42);
        assert_eq!(value["stream"], false);
    }
}
