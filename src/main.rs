use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digital_twin_backend::{
    config::{Config, CorsOrigins},
    routes,
    services::{
        chat::ChatService, completion::OpenAiClient, persona::Persona, retry::RetryingClient,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let persona = Persona::load(&config.persona_path)
        .await
        .context("loading persona")?;
    info!(
        path = %config.persona_path.display(),
        len = persona.len(),
        "Persona loaded"
    );

    let provider = &config.provider;
    let client = OpenAiClient::new(provider).context("building completion client")?;
    let client = RetryingClient::new(client, provider.max_retries, provider.retry_base);
    info!(
        model = %provider.model,
        timeout = ?provider.timeout,
        max_retries = provider.max_retries,
        "Completion client ready"
    );

    let state = Arc::new(AppState::new(
        ChatService::new(persona, Arc::new(client)),
        config.use_s3,
    ));

    match &config.cors_origins {
        CorsOrigins::Any => info!("CORS: any origin"),
        CorsOrigins::List(list) => info!("CORS: {} allowed origin(s)", list.len()),
    }

    let app = routes::create_router()
        .with_state(state)
        .layer(routes::cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    info!("Digital twin API listening on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
