// src/services/persona.rs
use std::{fmt::Debug, path::Path, sync::Arc};

use crate::error::ConfigError;

/// The system instruction every chat call is grounded on.
///
/// Loaded once at startup and shared read-only across requests; cloning
/// only bumps a reference count.
#[derive(Clone, PartialEq, Eq)]
pub struct Persona {
    text: Arc<str>,
}

impl Debug for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persona")
            .field("len", &self.text.len())
            .finish()
    }
}

impl Persona {
    /// Read the persona file. Surrounding whitespace is dropped.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::PersonaUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_text(raw).ok_or_else(|| ConfigError::PersonaEmpty(path.to_path_buf()))
    }

    /// `None` when the text is empty after trimming.
    pub fn from_text(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: Arc::from(trimmed),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
