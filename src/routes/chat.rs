use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, HealthResponse, InfoResponse},
    state::SharedState,
};

pub async fn root_handler() -> Json<InfoResponse> {
    Json(InfoResponse {
        status: "ok".to_string(),
        message: "AI Digital Twin API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        use_s3: state.use_s3,
    })
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload?;
    state.chat.respond(payload).await.map(Json)
}
