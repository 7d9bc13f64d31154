use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use digital_twin_backend::config::ProviderConfig;
use digital_twin_backend::error::UpstreamError;
use digital_twin_backend::services::completion::{CompletionClient, OpenAiClient, PromptMessage};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Seen {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

/// Serves a fake `/v1/chat/completions` and returns the base URL.
async fn spawn_provider(status: StatusCode, reply: Value, delay: Duration) -> (String, Seen) {
    let seen = Seen::default();
    let handler = move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
        let reply = reply.clone();
        async move {
            *seen.body.lock().unwrap() = Some(body);
            *seen.auth.lock().unwrap() = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            tokio::time::sleep(delay).await;
            (status, Json(reply))
        }
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(handler))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), seen)
}

fn provider(base_url: String, timeout: Duration) -> ProviderConfig {
    ProviderConfig {
        api_key: "sk-test".to_string(),
        base_url,
        model: "gpt-4o-mini".to_string(),
        temperature: Some(0.5),
        max_tokens: None,
        timeout,
        max_retries: 0,
        retry_base: Duration::from_millis(10),
    }
}

fn prompt() -> Vec<PromptMessage> {
    vec![
        PromptMessage::system("You are Max, a friendly assistant."),
        PromptMessage::user("What is your name?"),
    ]
}

#[tokio::test]
async fn test_successful_completion() {
    let reply = json!({
        "choices": [{ "message": { "role": "assistant", "content": "My name is Max." } }]
    });
    let (base, seen) = spawn_provider(StatusCode::OK, reply, Duration::ZERO).await;
    let client = OpenAiClient::new(&provider(base, Duration::from_secs(5))).unwrap();

    let text = client.complete(&prompt()).await.unwrap();
    assert_eq!(text, "My name is Max.");

    let body = seen.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.5);
    assert!(body.get("max_tokens").is_none());
    assert_eq!(
        body["messages"],
        json!([
            { "role": "system", "content": "You are Max, a friendly assistant." },
            { "role": "user", "content": "What is your name?" }
        ])
    );
    assert_eq!(seen.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (StatusCode::UNAUTHORIZED, "unauthorized"),
        (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        (StatusCode::INTERNAL_SERVER_ERROR, "status"),
    ];
    for (status, expected) in cases {
        let body = json!({ "error": { "message": "secret provider detail" } });
        let (base, _) = spawn_provider(status, body, Duration::ZERO).await;
        let client = OpenAiClient::new(&provider(base, Duration::from_secs(5))).unwrap();

        let err = client.complete(&prompt()).await.unwrap_err();
        let matched = match (&err, expected) {
            (UpstreamError::Unauthorized, "unauthorized") => true,
            (UpstreamError::RateLimited, "rate_limited") => true,
            (UpstreamError::Status(500), "status") => true,
            _ => false,
        };
        assert!(matched, "{status} mapped to {err:?}");
        assert!(!err.to_string().contains("secret provider detail"));
    }
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let (base, _) = spawn_provider(StatusCode::OK, json!({ "choices": [] }), Duration::ZERO).await;
    let client = OpenAiClient::new(&provider(base, Duration::from_secs(5))).unwrap();

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Malformed(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::OK, "<html>gateway hiccup</html>") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client =
        OpenAiClient::new(&provider(format!("http://{addr}/v1"), Duration::from_secs(5))).unwrap();
    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let reply = json!({ "choices": [{ "message": { "content": "late" } }] });
    let (base, _) = spawn_provider(StatusCode::OK, reply, Duration::from_secs(2)).await;
    let client = OpenAiClient::new(&provider(base, Duration::from_millis(100))).unwrap();

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        OpenAiClient::new(&provider(format!("http://{addr}/v1"), Duration::from_secs(5))).unwrap();
    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Network(_)));
}
