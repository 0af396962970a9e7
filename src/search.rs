use crate::provider::{ProviderError, StockSearchResult};

/// Fallback shown when an error carries no message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "알 수 없는 오류가 발생했습니다.";

/// Lifecycle of one search: `Idle → Loading → Success | Error`, with an
/// explicit `reset` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Identifies one in-flight search. Outcomes carrying a stale token are
/// discarded, so a slow earlier request can never overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// Terminal message sent back by the request task.
#[derive(Debug)]
pub struct SearchOutcome {
    pub token: SearchToken,
    pub outcome: Result<StockSearchResult, ProviderError>,
}

/// Owns the transient `status / result / error` triple for the session.
///
/// The controller itself never issues requests; the caller starts a search,
/// performs the dispatch, and feeds the outcome back with the token it was
/// handed.
pub struct SearchController {
    status: SearchStatus,
    result: Option<StockSearchResult>,
    error: Option<String>,
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self {
            status: SearchStatus::Idle,
            result: None,
            error: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn result(&self) -> Option<&StockSearchResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Begin a search. Returns `None` without any state change when the
    /// trimmed query is empty; otherwise clears previous result/error and
    /// enters `Loading`.
    pub fn start(&mut self, query: &str) -> Option<SearchToken> {
        if query.trim().is_empty() {
            return None;
        }

        self.generation += 1;
        self.status = SearchStatus::Loading;
        self.result = None;
        self.error = None;

        tracing::debug!(query = %query, generation = self.generation, "search started");
        Some(SearchToken(self.generation))
    }

    /// Store a successful result. Ignored when `token` is stale.
    pub fn resolve(&mut self, token: SearchToken, result: StockSearchResult) {
        if !self.is_current(token) {
            tracing::debug!(generation = token.0, "discarding stale search result");
            return;
        }
        self.status = SearchStatus::Success;
        self.result = Some(result);
        self.error = None;
    }

    /// Store a failure message. Ignored when `token` is stale. An empty
    /// message falls back to [`UNKNOWN_ERROR_MESSAGE`].
    pub fn reject(&mut self, token: SearchToken, message: impl Into<String>) {
        if !self.is_current(token) {
            tracing::debug!(generation = token.0, "discarding stale search error");
            return;
        }
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        self.status = SearchStatus::Error;
        self.result = None;
        self.error = Some(message);
    }

    /// Apply a terminal outcome from the request task.
    pub fn apply(&mut self, outcome: SearchOutcome) {
        match outcome.outcome {
            Ok(result) => self.resolve(outcome.token, result),
            Err(e) => self.reject(outcome.token, e.to_string()),
        }
    }

    /// Return to `Idle`, clearing result and error unconditionally. Any
    /// still in-flight request becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = SearchStatus::Idle;
        self.result = None;
        self.error = None;
    }

    fn is_current(&self, token: SearchToken) -> bool {
        self.status == SearchStatus::Loading && token.0 == self.generation
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::AiProvider;

    fn result_for(query: &str) -> StockSearchResult {
        StockSearchResult {
            query: query.to_string(),
            provider: AiProvider::Gemini,
            content: "## 📊 스냅샷".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sources: None,
        }
    }

    #[test]
    fn empty_query_does_not_leave_idle() {
        let mut controller = SearchController::new();
        assert_eq!(controller.start("   "), None);
        assert_eq!(controller.status(), SearchStatus::Idle);
    }

    #[test]
    fn stale_resolution_is_discarded() {
        let mut controller = SearchController::new();
        let first = controller.start("AAPL").unwrap();
        let second = controller.start("SCHD").unwrap();

        controller.resolve(second, result_for("SCHD"));
        assert_eq!(controller.status(), SearchStatus::Success);

        // The slow first request settles afterwards and must not win.
        controller.resolve(first, result_for("AAPL"));
        assert_eq!(controller.result().unwrap().query, "SCHD");
    }

    #[test]
    fn reset_invalidates_in_flight_request() {
        let mut controller = SearchController::new();
        let token = controller.start("QQQ").unwrap();
        controller.reset();

        controller.reject(token, "invalid api key");
        assert_eq!(controller.status(), SearchStatus::Idle);
        assert_eq!(controller.error(), None);
    }

    #[test]
    fn blank_error_message_falls_back() {
        let mut controller = SearchController::new();
        let token = controller.start("NVDA").unwrap();
        controller.reject(token, "  ");
        assert_eq!(controller.error(), Some(UNKNOWN_ERROR_MESSAGE));
    }
}
