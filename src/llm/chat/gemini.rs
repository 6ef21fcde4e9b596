use async_trait::async_trait;
use std::error::Error as StdError;
use log::info;

use super::{ ChatClient, ChatTurn, CompletionResponse, TurnRole };
use crate::llm::LlmConfig;
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

pub struct GeminiChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

fn to_rllm_message(role: ChatRole, content: &str) -> ChatMessage {
    ChatMessage {
        role,
        content: content.to_string(),
        message_type: MessageType::Text,
    }
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: u32
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key)
            .model(&chat_model)
            .max_tokens(max_tokens)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }

        let llm_provider = builder.build()?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "Google API key (GEMINI_API_KEY) is required for GeminiChatClient".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.max_output_tokens
        )
    }

    async fn send(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let resp = self.llm.chat(messages).await?;
        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        Ok(CompletionResponse { response: text })
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        info!(
            "GeminiChatClient::complete() → model={} base_url={:?}",
            self.model,
            self.base_url
        );
        self.send(&[to_rllm_message(ChatRole::User, prompt)]).await
    }

    async fn complete_chat(
        &self,
        context: &[ChatTurn],
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        info!(
            "GeminiChatClient::complete_chat() → model={} context_turns={}",
            self.model,
            context.len()
        );
        // rllm's Google backend sends Assistant turns with the "model" role.
        let mut messages: Vec<ChatMessage> = context
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => ChatRole::User,
                    TurnRole::Model => ChatRole::Assistant,
                };
                to_rllm_message(role, &turn.content)
            })
            .collect();
        messages.push(to_rllm_message(ChatRole::User, prompt));
        self.send(&messages).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
