// src/state.rs
use std::sync::Arc;

use crate::services::chat::ChatService;

pub type SharedState = Arc<AppState>;

/// Read-only after startup; handlers only ever borrow it.
pub struct AppState {
    pub chat: ChatService,
    pub use_s3: bool,
}

impl AppState {
    pub fn new(chat: ChatService, use_s3: bool) -> Self {
        Self { chat, use_s3 }
    }
}
