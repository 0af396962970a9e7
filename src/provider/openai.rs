use crate::keys::AiProvider;
use crate::provider::{
    error_for_status, user_prompt, ProviderError, SnapshotProvider, StockSearchResult,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o-mini";
// Low temperature: the snapshot should be factual, not creative.
const TEMPERATURE: f32 = 0.3;

/// OpenAI chat-completion client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base: String,
}

impl OpenAiClient {
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

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotProvider for OpenAiClient {
    async fn query(
        &self,
        query: &str,
        api_key: &str,
        system_prompt: &str,
    ) -> Result<StockSearchResult, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base);

        let request_body = ChatCompletionRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(query),
                },
            ],
            temperature: TEMPERATURE,
        };

        tracing::debug!(model = MODEL, query = %query, "openai chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_for_status(AiProvider::OpenAI, status, error_text));
        }

        let body: ChatCompletionResponse = response.json().await?;
        Ok(parse_chat_completion(query, body))
    }
}

/// Normalize a chat-completion body into a search result.
///
/// A missing choice or message content yields an empty snapshot rather than
/// an error. Never populates `sources`.
pub(crate) fn parse_chat_completion(
    query: &str,
    body: ChatCompletionResponse,
) -> StockSearchResult {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default();

    StockSearchResult {
        query: query.to_string(),
        provider: AiProvider::OpenAI,
        content,
        created_at: chrono::Utc::now().to_rfc3339(),
        sources: None,
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(value).expect("valid response json")
    }

    #[test]
    fn parses_first_choice_content() {
        let body = response_from(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "## 📊 AAPL 스냅샷" } },
                { "message": { "role": "assistant", "content": "두 번째 후보" } }
            ]
        }));

        let result = parse_chat_completion("AAPL", body);
        assert_eq!(result.query, "AAPL");
        assert_eq!(result.provider, AiProvider::OpenAI);
        assert_eq!(result.content, "## 📊 AAPL 스냅샷");
        assert_eq!(result.sources, None);
        assert!(chrono::DateTime::parse_from_rfc3339(&result.created_at).is_ok());
    }

    #[test]
    fn missing_content_defaults_to_empty_string() {
        let body = response_from(json!({ "choices": [{ "message": { "role": "assistant" } }] }));
        assert_eq!(parse_chat_completion("NVDA", body).content, "");

        let body = response_from(json!({ "choices": [] }));
        assert_eq!(parse_chat_completion("NVDA", body).content, "");
    }

    #[test]
    fn request_carries_system_then_user_message_at_low_temperature() {
        let request = ChatCompletionRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "prompt".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt("SCHD"),
                },
            ],
            temperature: TEMPERATURE,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "종목 정보를 요약해주세요: SCHD");
        assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }
}
