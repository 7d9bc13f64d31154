// src/services/chat.rs
use std::sync::Arc;

use tracing::{debug, error, info};

use super::completion::{CompletionClient, PromptMessage};
use super::persona::Persona;
use super::session::resolve_session_id;
use crate::error::AppError;
use crate::message::{ChatRequest, ChatResponse};

/// One chat turn: validate, resolve the session id, ground the message on
/// the persona and ask the completion provider for a reply.
#[derive(Clone)]
pub struct ChatService {
    persona: Persona,
    client: Arc<dyn CompletionClient>,
}

impl ChatService {
    pub fn new(persona: Persona, client: Arc<dyn CompletionClient>) -> Self {
        Self { persona, client }
    }

    /// System persona first, then the user's message. No history.
    pub fn build_prompt(&self, message: &str) -> Vec<PromptMessage> {
        vec![
            PromptMessage::system(self.persona.as_str()),
            PromptMessage::user(message),
        ]
    }

    pub async fn respond(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        // Blank means blank after trimming, but the user's text goes upstream as sent.
        let message = match request.message {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(AppError::Validation("Message cannot be empty".to_string())),
        };

        let session_id = resolve_session_id(request.session_id.as_deref());
        debug!(session_id = %session_id, message_len = message.len(), "Chat request accepted");

        let prompt = self.build_prompt(&message);
        let reply = self.client.complete(&prompt).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Completion call failed");
            AppError::Upstream(e)
        })?;

        info!(session_id = %session_id, reply_len = reply.len(), "Chat reply generated");
        Ok(ChatResponse { reply, session_id })
    }
}
