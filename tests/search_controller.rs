//! Tests for the search lifecycle state machine.

mod common;

use common::{canned_result, TestFixture};
use fin_snap::keys::AiProvider;
use fin_snap::provider::ProviderError;
use fin_snap::search::{
    SearchController, SearchOutcome, SearchStatus, UNKNOWN_ERROR_MESSAGE,
};

#[test]
fn successful_search_stores_the_result() {
    let mut controller = SearchController::new();
    let started_at = chrono::Utc::now();

    let token = controller.start("SCHD").expect("search starts");
    assert_eq!(controller.status(), SearchStatus::Loading);
    assert_eq!(controller.result(), None);
    assert_eq!(controller.error(), None);

    controller.resolve(token, canned_result("SCHD", AiProvider::Gemini));

    assert_eq!(controller.status(), SearchStatus::Success);
    let result = controller.result().expect("result stored");
    assert_eq!(result.query, "SCHD");
    assert_eq!(result.provider, AiProvider::Gemini);

    let created = chrono::DateTime::parse_from_rfc3339(&result.created_at)
        .expect("createdAt parses as a timestamp")
        .with_timezone(&chrono::Utc);
    assert!(created >= started_at - chrono::Duration::seconds(1));
}

#[test]
fn rejection_surfaces_the_message_verbatim() {
    let mut controller = SearchController::new();
    let token = controller.start("AAPL").unwrap();

    controller.reject(token, "invalid api key");

    assert_eq!(controller.status(), SearchStatus::Error);
    assert_eq!(controller.error(), Some("invalid api key"));
    assert_eq!(controller.result(), None);
}

#[test]
fn empty_message_falls_back_to_the_fixed_string() {
    let mut controller = SearchController::new();
    let token = controller.start("QQQ").unwrap();
    controller.reject(token, "");
    assert_eq!(controller.error(), Some(UNKNOWN_ERROR_MESSAGE));
}

#[test]
fn reset_returns_to_idle_from_any_state() {
    // From success.
    let mut controller = SearchController::new();
    let token = controller.start("NVDA").unwrap();
    controller.resolve(token, canned_result("NVDA", AiProvider::OpenAI));
    controller.reset();
    assert_eq!(controller.status(), SearchStatus::Idle);
    assert_eq!(controller.result(), None);
    assert_eq!(controller.error(), None);

    // From error.
    let token = controller.start("NVDA").unwrap();
    controller.reject(token, "quota exceeded");
    controller.reset();
    assert_eq!(controller.status(), SearchStatus::Idle);
    assert_eq!(controller.error(), None);

    // From loading.
    controller.start("NVDA").unwrap();
    controller.reset();
    assert_eq!(controller.status(), SearchStatus::Idle);
}

#[test]
fn empty_query_never_leaves_idle() {
    let mut controller = SearchController::new();
    assert!(controller.start("").is_none());
    assert!(controller.start("   \t").is_none());
    assert_eq!(controller.status(), SearchStatus::Idle);
}

#[test]
fn missing_credential_means_no_transition() {
    // Scenario: key saved only for gemini, openai active. The caller's
    // guard fails and dispatch is never invoked, so the controller is
    // never started and stays idle.
    let fixture = TestFixture::new();
    fixture.key_store.set_key(AiProvider::Gemini, "AIzaExampleKey123");
    fixture.key_store.set_provider(AiProvider::OpenAI);

    let mut controller = SearchController::new();
    if fixture.key_store.has_key(None) {
        controller.start("AAPL");
    }

    assert_eq!(controller.status(), SearchStatus::Idle);
}

#[test]
fn later_search_wins_over_a_slow_earlier_one() {
    let mut controller = SearchController::new();
    let slow = controller.start("AAPL").unwrap();
    let fast = controller.start("SCHD").unwrap();

    // The newer request settles first, then the stale one arrives.
    controller.apply(SearchOutcome {
        token: fast,
        outcome: Ok(canned_result("SCHD", AiProvider::Gemini)),
    });
    controller.apply(SearchOutcome {
        token: slow,
        outcome: Ok(canned_result("AAPL", AiProvider::Gemini)),
    });

    assert_eq!(controller.status(), SearchStatus::Success);
    assert_eq!(controller.result().unwrap().query, "SCHD");
}

#[test]
fn stale_error_cannot_clobber_a_newer_result() {
    let mut controller = SearchController::new();
    let slow = controller.start("AAPL").unwrap();
    let fast = controller.start("SCHD").unwrap();

    controller.apply(SearchOutcome {
        token: fast,
        outcome: Ok(canned_result("SCHD", AiProvider::OpenAI)),
    });
    controller.apply(SearchOutcome {
        token: slow,
        outcome: Err(ProviderError::InvalidApiKey),
    });

    assert_eq!(controller.status(), SearchStatus::Success);
    assert_eq!(controller.error(), None);
}

#[test]
fn provider_error_message_reaches_the_error_state() {
    let mut controller = SearchController::new();
    let token = controller.start("KODEX 200").unwrap();

    controller.apply(SearchOutcome {
        token,
        outcome: Err(ProviderError::Api("HTTP 500: upstream down".to_string())),
    });

    assert_eq!(controller.status(), SearchStatus::Error);
    assert_eq!(
        controller.error(),
        Some("API error: HTTP 500: upstream down")
    );
}
