pub mod gemini;
pub mod openai;

use crate::keys::AiProvider;
use crate::sections::{self, OutputSection};
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Errors surfaced by the provider adapters. Not recovered here; the
/// search controller turns them into a user-visible message.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API Key가 유효하지 않습니다. 설정에서 키를 확인해주세요.")]
    InvalidApiKey,

    #[error("요청 한도를 초과했습니다. 잠시 후 다시 시도해주세요.")]
    RateLimitExceeded,

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A citation returned by a search-grounded response (Gemini only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingSource {
    pub title: String,
    pub url: String,
}

/// One completed snapshot. Immutable; a new search produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockSearchResult {
    pub query: String,
    pub provider: AiProvider,
    /// Markdown text as returned by the provider.
    pub content: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Omitted entirely when the provider returned no usable citations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

/// Fixed user-turn wrapper shared by both adapters.
pub(crate) fn user_prompt(query: &str) -> String {
    format!("종목 정보를 요약해주세요: {query}")
}

/// Map a non-success HTTP status to a provider error.
pub(crate) fn error_for_status(
    provider: AiProvider,
    status: reqwest::StatusCode,
    body: String,
) -> ProviderError {
    tracing::warn!(
        provider = %provider,
        status = %status,
        error = %crate::logging::redact_secrets(&body),
        "provider api returned error"
    );
    match status.as_u16() {
        401 | 403 => ProviderError::InvalidApiKey,
        429 => ProviderError::RateLimitExceeded,
        _ => ProviderError::Api(format!("HTTP {status}: {body}")),
    }
}

/// Provider adapter seam: one request, one normalized result, no retries.
#[async_trait::async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn query(
        &self,
        query: &str,
        api_key: &str,
        system_prompt: &str,
    ) -> Result<StockSearchResult, ProviderError>;
}

/// Route one search to the adapter matching `provider`.
///
/// Builds the system prompt from the enabled sections, then delegates;
/// adapter errors propagate unchanged.
pub async fn dispatch(
    query: &str,
    provider: AiProvider,
    api_key: &str,
    output_config: &[OutputSection],
) -> Result<StockSearchResult, ProviderError> {
    let system_prompt = sections::build_system_prompt(output_config);

    tracing::debug!(
        provider = %provider,
        query = %query,
        enabled_sections = sections::enabled_count(output_config),
        "dispatching snapshot request"
    );

    match provider {
        AiProvider::Gemini => {
            GeminiClient::new()
                .query(query, api_key, &system_prompt)
                .await
        }
        AiProvider::OpenAI => {
            OpenAiClient::new()
                .query(query, api_key, &system_prompt)
                .await
        }
    }
}
