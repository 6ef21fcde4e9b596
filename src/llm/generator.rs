use log::{ debug, error };
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

use super::chat::{ ChatClient, ChatTurn, TurnRole };
use crate::format::format_response;
use crate::models::chat::Sender;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation input: {0}")]
    InvalidInput(String),

    #[error("generation failed: {0}")]
    Provider(#[source] Box<dyn StdError + Send + Sync>),
}

/// A past message as the generator sees it: who said it and what was said.
#[derive(Debug, Clone, Copy)]
pub struct HistoryEntry<'a> {
    pub sender: Sender,
    pub content: &'a str,
}

fn to_turn(entry: &HistoryEntry<'_>) -> ChatTurn {
    let role = match entry.sender {
        Sender::User => TurnRole::User,
        Sender::Ai => TurnRole::Model,
    };
    ChatTurn { role, content: entry.content.to_string() }
}

/// Formats everything a [`ChatClient`] returns and turns its failures into
/// [`GenerationError::Provider`].
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn ChatClient>,
}

impl Generator {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn model(&self) -> String {
        self.client.get_model()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let resp = self.client.complete(prompt).await.map_err(|e| {
            error!("Generation failed for single prompt: {}", e);
            GenerationError::Provider(e)
        })?;
        Ok(format_response(&resp.response))
    }

    /// Replies to the last entry of `history`, using the earlier entries as
    /// conversation context. An empty history is rejected before any call.
    pub async fn generate_chat(&self, history: &[HistoryEntry<'_>]) -> Result<String, GenerationError> {
        let (last, earlier) = history
            .split_last()
            .ok_or_else(|| GenerationError::InvalidInput("history must not be empty".to_string()))?;

        let context: Vec<ChatTurn> = earlier.iter().map(to_turn).collect();
        debug!("Generating chat reply with {} context turn(s)", context.len());

        let result = if context.is_empty() {
            self.client.complete(last.content).await
        } else {
            self.client.complete_chat(&context, last.content).await
        };

        let resp = result.map_err(|e| {
            error!("Generation failed for chat history of {} message(s): {}", history.len(), e);
            GenerationError::Provider(e)
        })?;
        Ok(format_response(&resp.response))
    }
}
