use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Storage key for the persisted API key configuration.
pub const API_KEYS_STORAGE_KEY: &str = "fin-snap:api-keys";

/// Supported AI providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    OpenAI,
}

impl AiProvider {
    /// Display label used in result metadata.
    pub fn label(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "Google Gemini",
            AiProvider::OpenAI => "OpenAI",
        }
    }

    /// Short indicator shown on the landing view.
    pub fn indicator(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "✨ Gemini",
            AiProvider::OpenAI => "🤖 OpenAI",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            AiProvider::Gemini => "gemini",
            AiProvider::OpenAI => "openai",
        };
        f.write_str(tag)
    }
}

/// API keys the user has saved, plus which provider receives the next search.
///
/// Absent keys are `None`, never empty strings; `set_key` normalizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default = "default_provider")]
    pub active_provider: AiProvider,
}

fn default_provider() -> AiProvider {
    AiProvider::Gemini
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            gemini: None,
            openai: None,
            active_provider: AiProvider::Gemini,
        }
    }
}

impl ApiKeyConfig {
    /// The stored key for `provider`, if any.
    pub fn key_for(&self, provider: AiProvider) -> Option<&str> {
        match provider {
            AiProvider::Gemini => self.gemini.as_deref(),
            AiProvider::OpenAI => self.openai.as_deref(),
        }
    }
}

/// Persists [`ApiKeyConfig`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct KeyStore {
    store: Arc<dyn KeyValueStore>,
}

impl KeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted configuration, falling back to defaults when the
    /// value is absent or unparseable. Never fails.
    pub fn load(&self) -> ApiKeyConfig {
        let Some(raw) = self.store.get(API_KEYS_STORAGE_KEY) else {
            return ApiKeyConfig::default();
        };
        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "stored api key config unreadable, using defaults");
                ApiKeyConfig::default()
            }
        }
    }

    /// Persist `config` as-is.
    pub fn save(&self, config: &ApiKeyConfig) {
        match serde_json::to_string(config) {
            Ok(raw) => self.store.set(API_KEYS_STORAGE_KEY, &raw),
            Err(e) => tracing::debug!(error = %e, "failed to serialize api key config"),
        }
    }

    /// Store a key for `provider`. A blank key clears the stored value.
    pub fn set_key(&self, provider: AiProvider, key: &str) -> ApiKeyConfig {
        let mut config = self.load();
        let value = {
            let trimmed = key.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        match provider {
            AiProvider::Gemini => config.gemini = value,
            AiProvider::OpenAI => config.openai = value,
        }
        self.save(&config);
        config
    }

    /// Switch the active provider.
    pub fn set_provider(&self, provider: AiProvider) -> ApiKeyConfig {
        let mut config = self.load();
        config.active_provider = provider;
        self.save(&config);
        config
    }

    /// Remove all persisted key data.
    pub fn clear(&self) {
        self.store.remove(API_KEYS_STORAGE_KEY);
    }

    /// Whether a non-empty key exists for `provider` (default: the active
    /// provider).
    pub fn has_key(&self, provider: Option<AiProvider>) -> bool {
        let config = self.load();
        let target = provider.unwrap_or(config.active_provider);
        config
            .key_for(target)
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}
