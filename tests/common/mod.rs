#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use digital_twin_backend::config::CorsOrigins;
use digital_twin_backend::error::UpstreamError;
use digital_twin_backend::routes::{cors_layer, create_router};
use digital_twin_backend::services::chat::ChatService;
use digital_twin_backend::services::completion::{CompletionClient, PromptMessage, Role};
use digital_twin_backend::services::persona::Persona;
use digital_twin_backend::state::AppState;

pub const PERSONA: &str = "You are Max, a friendly assistant.";

pub enum Behaviour {
    /// Reply with a fixed string.
    Fixed(String),
    /// Reply with "re: <user message>".
    Echo,
    /// Fail every call.
    Fail(fn() -> UpstreamError),
}

/// Records every prompt it receives.
pub struct StubClient {
    behaviour: Behaviour,
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl StubClient {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        // Yield so concurrent requests interleave.
        tokio::task::yield_now().await;
        match &self.behaviour {
            Behaviour::Fixed(reply) => Ok(reply.clone()),
            Behaviour::Echo => {
                let user = messages
                    .iter()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(format!("re: {user}"))
            }
            Behaviour::Fail(make) => Err(make()),
        }
    }
}

pub fn app_with(stub: Arc<StubClient>, origins: CorsOrigins, use_s3: bool) -> Router {
    let persona = Persona::from_text(PERSONA).unwrap();
    let state = Arc::new(AppState::new(ChatService::new(persona, stub), use_s3));
    create_router()
        .with_state(state)
        .layer(cors_layer(&origins))
}

pub fn app(stub: Arc<StubClient>) -> Router {
    app_with(stub, CorsOrigins::Any, false)
}
