// src/config.rs
use std::{fmt::Debug, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use axum::http::HeaderValue;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Origins allowed to call the API from a browser.
#[derive(Clone, Debug, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// Parameters for the completion provider. Never from request input.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base: Duration,
}

impl Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base", &self.retry_base)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    pub cors_origins: CorsOrigins,
    pub persona_path: PathBuf,
    pub use_s3: bool,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let provider = ProviderConfig {
            api_key,
            base_url,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_opt("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"))?,
            max_tokens: parse_opt("OPENAI_MAX_TOKENS", get("OPENAI_MAX_TOKENS"))?,
            timeout: Duration::from_secs(
                parse_opt("UPSTREAM_TIMEOUT_SECS", get("UPSTREAM_TIMEOUT_SECS"))?.unwrap_or(60),
            ),
            max_retries: parse_opt("UPSTREAM_MAX_RETRIES", get("UPSTREAM_MAX_RETRIES"))?
                .unwrap_or(2),
            retry_base: Duration::from_millis(
                parse_opt("UPSTREAM_RETRY_BASE_MS", get("UPSTREAM_RETRY_BASE_MS"))?
                    .unwrap_or(500),
            ),
        };

        let cors_origins = parse_origins(
            get("CORS_ORIGINS")
                .as_deref()
                .unwrap_or("http://localhost:3000"),
        )?;

        let use_s3 = match get("USE_S3") {
            Some(v) => parse_bool("USE_S3", &v)?,
            None => false,
        };

        let bind_addr = parse_opt("BIND_ADDR", get("BIND_ADDR"))?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        Ok(Self {
            provider,
            cors_origins,
            persona_path: get("PERSONA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("me.txt")),
            use_s3,
            bind_addr,
        })
    }
}

fn parse_opt<T>(var: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("{v:?}: {e}"),
        })
    })
    .transpose()
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("{other:?} is not a boolean"),
        }),
    }
}

pub fn parse_origins(raw: &str) -> Result<CorsOrigins, ConfigError> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.contains(&"*") {
        return Ok(CorsOrigins::Any);
    }

    let origins = entries
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                reason: format!("{origin:?} is not a valid origin"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(ConfigError::Invalid {
            var: "CORS_ORIGINS",
            reason: "no origins given".to_string(),
        });
    }
    Ok(CorsOrigins::List(origins))
}
