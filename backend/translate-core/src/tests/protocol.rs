use crate::config::{GEMINI_API_KEY_ENV, Preferences};
use crate::ipc::protocol::UNCORRELATED_ID;
use crate::ipc::{ClientMessage, ClientRequest, PreferencesView, ServerMessage};
use crate::session::{OverlayEvent, OverlayState};

use serde_json::json;
use serial_test::serial;

#[test]
fn given_translate_frame_when_parsed_then_fields_are_read() {
    let message = ClientMessage::parse(
        r#"{"id":3,"action":"translateText","text":"Hello","targetLang":"French"}"#,
    )
    .unwrap();

    assert_eq!(message.id, 3);
    assert_eq!(
        message.request,
        ClientRequest::TranslateText {
            text: "Hello".to_string(),
            target_lang: Some("French".to_string()),
        }
    );
}

#[test]
fn given_context_menu_frame_when_parsed_then_tab_and_selection_are_read() {
    let message = ClientMessage::parse(
        r#"{"id":4,"action":"contextMenuClick","tabId":12,"selectionText":"Guten Tag"}"#,
    )
    .unwrap();

    assert_eq!(
        message.request,
        ClientRequest::ContextMenuClick {
            tab_id: 12,
            selection_text: "Guten Tag".to_string(),
        }
    );
}

#[test]
fn given_frame_without_payload_fields_when_parsed_then_unit_actions_work() {
    let wake = ClientMessage::parse(r#"{"action":"wake"}"#).unwrap();
    let prefs = ClientMessage::parse(r#"{"id":9,"action":"getPreferences"}"#).unwrap();

    assert_eq!(wake.id, UNCORRELATED_ID);
    assert_eq!(wake.request, ClientRequest::Wake);
    assert_eq!(prefs.request, ClientRequest::GetPreferences);
}

/// **VALUE**: Verifies a readable id is kept even when the action is unknown.
///
/// **WHY THIS MATTERS**: The UI waits on the id; an error under id 0 would leave its
/// request hanging until timeout.
#[test]
fn given_unknown_action_with_id_when_parsed_then_error_keeps_id() {
    let (id, _) = ClientMessage::parse(r#"{"id":5,"action":"launchRockets"}"#).unwrap_err();

    assert_eq!(id, 5);
}

#[test]
fn given_invalid_json_when_parsed_then_error_is_uncorrelated() {
    let (id, _) = ClientMessage::parse("{not json").unwrap_err();

    assert_eq!(id, UNCORRELATED_ID);
}

/// **VALUE**: Verifies secrets never reach the log through `Debug`.
#[test]
fn given_auth_and_save_requests_when_debug_formatted_then_secrets_are_hidden() {
    let auth = ClientMessage::parse(r#"{"action":"auth","token":"tok-123"}"#).unwrap();
    let save =
        ClientMessage::parse(r#"{"id":2,"action":"savePreferences","apiKey":"AIza-secret"}"#)
            .unwrap();

    assert_eq!(format!("{:?}", auth.request), "Auth");
    assert!(!format!("{:?}", save).contains("AIza-secret"));
}

#[test]
fn given_server_messages_when_serialized_then_shapes_match_ui_contract() {
    let cases = [
        (ServerMessage::result(1, "Bonjour"), json!({"id": 1, "result": "Bonjour"})),
        (ServerMessage::error(2, "nope"), json!({"id": 2, "error": "nope"})),
        (ServerMessage::ok(3), json!({"id": 3, "ok": true})),
        (ServerMessage::ignored(4), json!({"id": 4, "ignored": true})),
        (
            ServerMessage::authenticated(true),
            json!({"id": 0, "authenticated": true}),
        ),
    ];

    for (message, expected) in cases {
        assert_eq!(serde_json::to_value(&message).unwrap(), expected);
    }
}

#[test]
fn given_overlay_message_when_serialized_then_view_is_nested() {
    let view = OverlayState::Absent
        .apply(OverlayEvent::Requested {
            request: 1,
            original: "Hello".to_string(),
        })
        .view()
        .unwrap();

    let json = serde_json::to_value(ServerMessage::overlay(6, view)).unwrap();

    assert_eq!(json["id"], 6);
    assert_eq!(json["overlay"]["type"], "loading");
    assert_eq!(json["overlay"]["title"], "AI Translation");
}

/// **VALUE**: Verifies the preferences view reports key presence, never the key.
///
/// **BUG THIS CATCHES**: Would catch `Preferences` being serialized to the UI directly.
#[test]
fn given_preferences_with_key_when_viewed_then_key_is_not_sent() {
    let preferences = Preferences {
        api_key: Some("AIza-secret".to_string()),
        ..Preferences::default()
    };

    let json = serde_json::to_string(&ServerMessage::preferences(
        7,
        PreferencesView::from(&preferences),
    ))
    .unwrap();

    assert!(!json.contains("AIza-secret"));
    assert!(json.contains("\"hasApiKey\":true"));
    assert!(json.contains("\"targetLang\":\"English\""));
}

/// **VALUE**: Verifies `hasApiKey` reflects the key a translation would actually use.
///
/// **WHY THIS MATTERS**: Users who configure the key through `GEMINI_API_KEY` or `.env`
/// can translate; the popup must not ask them to set a key.
///
/// **BUG THIS CATCHES**: Would catch the view only looking at the stored preference.
#[test]
#[serial]
fn given_key_only_in_environment_when_viewed_then_has_api_key() {
    let preferences = Preferences::default();

    unsafe { std::env::set_var(GEMINI_API_KEY_ENV, "env-key") };
    let with_env = PreferencesView::from(&preferences);

    unsafe { std::env::remove_var(GEMINI_API_KEY_ENV) };
    let without = PreferencesView::from(&preferences);

    assert!(with_env.has_api_key);
    assert!(!without.has_api_key);
}
