use crate::keys::AiProvider;
use crate::provider::{
    error_for_status, user_prompt, GroundingSource, ProviderError, SnapshotProvider,
    StockSearchResult,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash";

/// Gemini `generateContent` client with Google Search grounding enabled.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotProvider for GeminiClient {
    async fn query(
        &self,
        query: &str,
        api_key: &str,
        system_prompt: &str,
    ) -> Result<StockSearchResult, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, MODEL, api_key
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_prompt(query),
                }],
            }],
            // gemini-2.5-flash expects `googleSearch` for grounding.
            tools: vec![Tool {
                google_search: serde_json::json!({}),
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
        };

        tracing::debug!(model = MODEL, query = %query, "gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_for_status(AiProvider::Gemini, status, error_text));
        }

        let body: GenerateContentResponse = response.json().await?;
        parse_generate_content(query, body)
    }
}

/// Normalize a `generateContent` body into a search result.
pub(crate) fn parse_generate_content(
    query: &str,
    body: GenerateContentResponse,
) -> Result<StockSearchResult, ProviderError> {
    let candidate = body
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| ProviderError::Malformed("no candidate in response".to_string()))?;

    let content = candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    let sources: Vec<GroundingSource> = candidate
        .grounding_metadata
        .and_then(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let url = web.uri.unwrap_or_default();
            if url.is_empty() {
                return None;
            }
            Some(GroundingSource {
                title: web.title.unwrap_or_default(),
                url,
            })
        })
        .collect();

    Ok(StockSearchResult {
        query: query.to_string(),
        provider: AiProvider::Gemini,
        content,
        created_at: chrono::Utc::now().to_rfc3339(),
        sources: if sources.is_empty() {
            None
        } else {
            Some(sources)
        },
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    system_instruction: Content,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}
