use super::support::{Reply, ScriptedBackend};
use crate::config::{GEMINI_API_KEY_ENV, Preferences};
use crate::ipc::{
    ClientMessage, ClientRequest, HostState, PreferenceStore, ServerBody, ServerMessage,
    TEXT_TOO_LONG_MESSAGE, route,
};
use crate::model_list::ModelList;
use crate::pipeline::{PipelineSettings, TranslationPipeline};
use crate::session::{OverlayKind, OverlayState, SessionRegistry};

use std::time::Duration;

use serial_test::serial;

const FLASH: &str = "gemini-2.5-flash";

fn host(backend: ScriptedBackend, preferences: Preferences) -> HostState<ScriptedBackend> {
    HostState::new(
        TranslationPipeline::new(backend, ModelList::default(), PipelineSettings::default()),
        SessionRegistry::default(),
        PreferenceStore::in_memory(preferences),
    )
}

fn host_with_debounce(
    backend: ScriptedBackend,
    debounce: Duration,
) -> HostState<ScriptedBackend> {
    HostState::new(
        TranslationPipeline::new(backend, ModelList::default(), PipelineSettings::default()),
        SessionRegistry::new(debounce),
        PreferenceStore::in_memory(with_key()),
    )
}

fn with_key() -> Preferences {
    Preferences {
        api_key: Some("stored-key".to_string()),
        ..Preferences::default()
    }
}

async fn send(state: &HostState<ScriptedBackend>, id: u64, request: ClientRequest) -> ServerMessage {
    route(state, ClientMessage { id, request }).await
}

fn translate(text: &str, target_lang: Option<&str>) -> ClientRequest {
    ClientRequest::TranslateText {
        text: text.to_string(),
        target_lang: target_lang.map(str::to_string),
    }
}

fn click(tab_id: i64, selection: &str) -> ClientRequest {
    ClientRequest::ContextMenuClick {
        tab_id,
        selection_text: selection.to_string(),
    }
}

/// **VALUE**: Verifies a popup translation answers with the result and remembers it.
///
/// **WHY THIS MATTERS**: The popup restores `lastResult` when reopened.
#[tokio::test]
async fn given_popup_text_when_translated_then_result_is_returned_and_stored() {
    let state = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Bonjour")),
        with_key(),
    );

    let response = send(&state, 1, translate("  Hello  ", Some("French"))).await;

    assert_eq!(response, ServerMessage::result(1, "Bonjour"));
    let preferences = state.preferences().snapshot().await;
    assert_eq!(preferences.last_result.as_deref(), Some("Bonjour"));
    assert_eq!(preferences.last_target_lang.as_deref(), Some("French"));

    let calls = state.pipeline().backend().calls();
    assert!(calls[0].prompt.contains("\n\nHello\n\n"));
    assert_eq!(calls[0].key, "stored-key");
}

#[tokio::test]
async fn given_blank_popup_text_when_translated_then_error_without_calls() {
    let state = host(ScriptedBackend::new(), with_key());

    let response = send(&state, 2, translate("   ", None)).await;

    assert_eq!(response, ServerMessage::error(2, "Please enter text to translate"));
    assert!(state.pipeline().backend().calls().is_empty());
}

/// **VALUE**: Verifies the 4000 character cap is enforced at the edge.
///
/// **BUG THIS CATCHES**: Would catch the limit counting bytes instead of characters
/// (multi-byte scripts would be rejected early) or being skipped entirely.
#[tokio::test]
async fn given_text_over_limit_when_translated_then_rejected() {
    let state = host(ScriptedBackend::new(), with_key());

    let at_limit = "é".repeat(4000);
    let over_limit = "a".repeat(4001);

    let over = send(&state, 3, translate(&over_limit, None)).await;
    assert_eq!(over, ServerMessage::error(3, TEXT_TOO_LONG_MESSAGE));
    assert_eq!(TEXT_TOO_LONG_MESSAGE, "Text too long (max 4000 chars)");

    let at = send(&state, 4, translate(&at_limit, None)).await;
    assert_ne!(at, ServerMessage::error(4, TEXT_TOO_LONG_MESSAGE));
}

#[tokio::test]
async fn given_no_requested_language_when_translated_then_stored_then_default_is_used() {
    let stored = Preferences {
        target_lang: Some("German".to_string()),
        ..with_key()
    };
    let with_stored = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Hallo")),
        stored,
    );
    let with_default = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Hello")),
        with_key(),
    );

    send(&with_stored, 1, translate("Bonjour", None)).await;
    send(&with_default, 1, translate("Bonjour", Some(" "))).await;

    assert!(with_stored.pipeline().backend().calls()[0].prompt.starts_with("Translate ONLY to German."));
    assert!(with_default.pipeline().backend().calls()[0].prompt.starts_with("Translate ONLY to English."));
}

#[tokio::test]
#[serial]
async fn given_no_api_key_when_translated_then_user_is_asked_for_one() {
    unsafe { std::env::remove_var(GEMINI_API_KEY_ENV) };
    let state = host(ScriptedBackend::new(), Preferences::default());

    let response = send(&state, 5, translate("Hello", None)).await;

    assert_eq!(response, ServerMessage::error(5, "Please set your Gemini API key"));
    assert!(state.pipeline().backend().calls().is_empty());
}

/// **VALUE**: Verifies a selection click drives the overlay to its result.
///
/// **BUG THIS CATCHES**: Would catch the overlay staying in `loading` after a successful
/// translation, or selection results overwriting the popup's `lastResult`.
#[tokio::test]
async fn given_selection_click_when_translated_then_overlay_shows_result() {
    let state = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Good day")),
        with_key(),
    );

    let response = send(&state, 10, click(42, "Guten Tag")).await;

    match response.body {
        ServerBody::Overlay { overlay } => {
            assert_eq!(overlay.kind, OverlayKind::Translation);
            assert_eq!(overlay.original, "Guten Tag");
            assert_eq!(overlay.content, "Good day");
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert!(state.preferences().snapshot().await.last_result.is_none());
    assert!(state.sessions().lock().await.get(42).unwrap().overlay_injected());
}

/// **VALUE**: Verifies a second click inside the debounce window is ignored.
#[tokio::test]
async fn given_double_click_when_routed_then_second_is_ignored() {
    let state = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Good day")),
        with_key(),
    );

    send(&state, 1, click(42, "Guten Tag")).await;
    let second = send(&state, 2, click(42, "Guten Tag")).await;

    assert_eq!(second, ServerMessage::ignored(2));
    assert_eq!(state.pipeline().backend().calls().len(), 1);
}

/// **VALUE**: Verifies overlapping selections on one tab never mix up texts.
///
/// **WHY THIS MATTERS**: A translation can take several seconds across the fallback
/// chain, so a second selection outside the debounce window often starts before the first
/// one finishes.
///
/// **BUG THIS CATCHES**: Would catch the first translation landing on the second
/// selection's loading overlay, showing "Danke schön" next to "Good day".
#[tokio::test]
async fn given_overlapping_clicks_on_one_tab_when_first_finishes_late_then_only_latest_is_shown() {
    let state = host_with_debounce(
        ScriptedBackend::new()
            .reply_when_prompt_contains(
                "Guten Tag",
                Reply::Delayed(Duration::from_millis(300), "Good day"),
            )
            .reply(FLASH, Reply::Delayed(Duration::from_millis(300), "Thank you")),
        Duration::from_millis(50),
    );

    let first = send(&state, 1, click(7, "Guten Tag"));
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        send(&state, 2, click(7, "Danke schön")).await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, ServerMessage::ignored(1));
    match second.body {
        ServerBody::Overlay { overlay } => {
            assert_eq!(overlay.original, "Danke schön");
            assert_eq!(overlay.content, "Thank you");
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(
        state.sessions().lock().await.overlay(7),
        Some(&OverlayState::ShowingResult {
            original: "Danke schön".to_string(),
            translation: "Thank you".to_string(),
        })
    );
}

#[tokio::test]
async fn given_failing_chain_when_selection_translated_then_overlay_shows_error() {
    let state = host(ScriptedBackend::new(), with_key());

    let response = send(&state, 11, click(7, "Guten Tag")).await;

    match response.body {
        ServerBody::Overlay { overlay } => {
            assert_eq!(overlay.kind, OverlayKind::Error);
            assert_eq!(overlay.title, "Translation Error");
            assert_eq!(overlay.content, "All models exhausted. Check quotas or try later.");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn given_open_overlay_when_dismissed_and_tab_closed_then_session_is_gone() {
    let state = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Good day")),
        with_key(),
    );
    send(&state, 1, click(3, "Guten Tag")).await;

    let dismissed = send(&state, 2, ClientRequest::DismissOverlay { tab_id: 3 }).await;
    assert_eq!(dismissed, ServerMessage::ok(2));
    assert!(!state.sessions().lock().await.overlay(3).unwrap().is_visible());

    let closed = send(&state, 3, ClientRequest::TabClosed { tab_id: 3 }).await;
    assert_eq!(closed, ServerMessage::ok(3));
    assert!(state.sessions().lock().await.get(3).is_none());
}

/// **VALUE**: Verifies saved preferences are visible to the next request.
///
/// **BUG THIS CATCHES**: Would catch `savePreferences` acknowledging before the store
/// applied the change, so the following translation still runs without a key.
#[tokio::test]
#[serial]
async fn given_saved_key_when_translating_next_then_key_is_used() {
    unsafe { std::env::remove_var(GEMINI_API_KEY_ENV) };
    let state = host(
        ScriptedBackend::new().reply(FLASH, Reply::Text("Hola")),
        Preferences::default(),
    );

    let saved = send(
        &state,
        1,
        ClientRequest::SavePreferences {
            api_key: Some("new-key".to_string()),
            target_lang: Some("Spanish".to_string()),
            last_input: Some("Hello".to_string()),
        },
    )
    .await;
    let translated = send(&state, 2, translate("Hello", None)).await;
    let preferences = send(&state, 3, ClientRequest::GetPreferences).await;

    assert_eq!(saved, ServerMessage::ok(1));
    assert_eq!(translated, ServerMessage::result(2, "Hola"));
    match preferences.body {
        ServerBody::Preferences { preferences } => {
            assert!(preferences.has_api_key);
            assert_eq!(preferences.target_lang, "Spanish");
            assert_eq!(preferences.last_input.as_deref(), Some("Hello"));
            assert_eq!(preferences.last_result.as_deref(), Some("Hola"));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn given_empty_api_key_when_saved_then_key_is_removed() {
    let state = host(ScriptedBackend::new(), with_key());

    send(
        &state,
        1,
        ClientRequest::SavePreferences {
            api_key: Some(String::new()),
            target_lang: None,
            last_input: None,
        },
    )
    .await;

    assert!(!state.preferences().snapshot().await.has_api_key());
}

#[tokio::test]
async fn given_authenticated_connection_when_auth_or_wake_sent_then_answered() {
    let state = host(ScriptedBackend::new(), with_key());

    let auth = send(
        &state,
        1,
        ClientRequest::Auth {
            token: "again".to_string(),
        },
    )
    .await;
    let wake = send(&state, 2, ClientRequest::Wake).await;

    assert_eq!(auth, ServerMessage::error(1, "Already authenticated"));
    assert_eq!(wake, ServerMessage::ok(2));
}
