use super::helpers::{
    TEST_AUTH_TOKEN, authenticate, connect_authenticated, connect_to_server, is_connection_closed,
    receive_json, send_json, start_test_host,
};

use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// **VALUE**: Verifies the auth handshake accepts the configured token.
///
/// **WHY THIS MATTERS**: Every request after the handshake spends the user's API quota;
/// only the extension that knows the token may send them.
///
/// **BUG THIS CATCHES**: Would catch the handshake reading the wrong field or replying
/// with a frame the UI cannot recognize.
#[tokio::test]
async fn given_valid_token_when_authenticating_then_succeeds() {
    // GIVEN: A running server
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_to_server(host.handle.port()).await;

    // WHEN: Authenticating with the right token
    let authenticated = authenticate(&mut ws, TEST_AUTH_TOKEN).await;

    // THEN: Accepted, and the connection stays open
    assert!(authenticated);
    assert!(!is_connection_closed(&mut ws).await);
}

/// **VALUE**: Verifies a wrong token gets a negative reply and a closed socket.
///
/// **BUG THIS CATCHES**: Would catch a server that replies `false` but keeps serving
/// requests on the same connection.
#[tokio::test]
async fn given_invalid_token_when_authenticating_then_fails_and_closes() {
    // GIVEN: A running server
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_to_server(host.handle.port()).await;

    // WHEN: Authenticating with the wrong token
    let authenticated = authenticate(&mut ws, "wrong-token").await;

    // THEN: Rejected and closed
    assert!(!authenticated);
    assert!(is_connection_closed(&mut ws).await);
}

#[tokio::test]
async fn given_non_auth_first_frame_when_sent_then_rejected_and_closed() {
    // GIVEN: A fresh connection
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_to_server(host.handle.port()).await;

    // WHEN: Sending a translation before authenticating
    send_json(
        &mut ws,
        &json!({ "id": 3, "action": "translateText", "text": "Hello" }),
    )
    .await;

    // THEN: Authentication fails and no provider call was made
    let response = receive_json(&mut ws).await;
    assert_eq!(response["authenticated"], json!(false));
    assert!(is_connection_closed(&mut ws).await);
    let requests = host.provider.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

/// **VALUE**: Verifies a translation round trip through the real socket and provider.
///
/// **BUG THIS CATCHES**: Would catch a reply without the request id, or the `result`
/// field being named differently from what the UI reads.
#[tokio::test]
async fn given_authenticated_client_when_translate_text_then_result_echoes_id() {
    // GIVEN: An authenticated connection
    let host = start_test_host("**Bonjour le monde**").await;
    let mut ws = connect_authenticated(host.handle.port()).await;

    // WHEN: Requesting a translation
    send_json(
        &mut ws,
        &json!({ "id": 42, "action": "translateText", "text": "Hello world", "targetLang": "French" }),
    )
    .await;

    // THEN: The sanitized translation comes back under the same id
    let response = receive_json(&mut ws).await;
    assert_eq!(response, json!({ "id": 42, "result": "Bonjour le monde" }));
}

#[tokio::test]
async fn given_too_long_text_when_translate_text_then_error_without_provider_call() {
    // GIVEN: An authenticated connection
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_authenticated(host.handle.port()).await;

    // WHEN: Sending 4001 characters
    let text = "a".repeat(4001);
    send_json(&mut ws, &json!({ "id": 5, "action": "translateText", "text": text })).await;

    // THEN: Rejected before any upstream request
    let response = receive_json(&mut ws).await;
    assert_eq!(response["id"], json!(5));
    assert_eq!(response["error"], json!("Text too long (max 4000 chars)"));
    let requests = host.provider.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn given_context_menu_click_when_sent_then_overlay_shows_translation() {
    // GIVEN: An authenticated connection
    let host = start_test_host("Hallo").await;
    let mut ws = connect_authenticated(host.handle.port()).await;

    // WHEN: The extension reports a context-menu click on tab 7
    send_json(
        &mut ws,
        &json!({ "id": 9, "action": "contextMenuClick", "tabId": 7, "selectionText": "Hello" }),
    )
    .await;

    // THEN: The overlay carries the translation and the original selection
    let response = receive_json(&mut ws).await;
    assert_eq!(response["id"], json!(9));
    assert_eq!(response["overlay"]["type"], json!("translation"));
    assert_eq!(response["overlay"]["title"], json!("AI Translation"));
    assert_eq!(response["overlay"]["original"], json!("Hello"));
    assert_eq!(response["overlay"]["content"], json!("Hallo"));
}

/// **VALUE**: Verifies malformed frames are answered, not fatal.
///
/// **WHY THIS MATTERS**: One bad frame from a buggy UI build must not drop the
/// connection for every later request.
///
/// **BUG THIS CATCHES**: Would catch a `?` on the parse result inside the read loop.
#[tokio::test]
async fn given_invalid_frames_when_sent_then_errors_and_connection_survives() {
    // GIVEN: An authenticated connection
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_authenticated(host.handle.port()).await;

    // WHEN: Sending garbage, then an unknown action, then a binary frame, then wake
    ws.send(Message::Text("not json".into()))
        .await
        .expect("Failed to send message");
    let garbage = receive_json(&mut ws).await;

    send_json(&mut ws, &json!({ "id": 11, "action": "selfDestruct" })).await;
    let unknown = receive_json(&mut ws).await;

    ws.send(Message::Binary(vec![1u8, 2, 3].into()))
        .await
        .expect("Failed to send message");

    send_json(&mut ws, &json!({ "id": 12, "action": "wake" })).await;
    let wake = receive_json(&mut ws).await;

    // THEN: Uncorrelated error, correlated error, binary ignored, wake answered
    assert_eq!(garbage["id"], json!(0));
    assert!(garbage["error"].as_str().is_some_and(|e| e.starts_with("Invalid message")));
    assert_eq!(unknown["id"], json!(11));
    assert!(unknown["error"].is_string());
    assert_eq!(wake, json!({ "id": 12, "ok": true }));
}

#[tokio::test]
async fn given_saved_preferences_when_get_preferences_then_key_is_not_returned() {
    // GIVEN: An authenticated connection
    let host = start_test_host("Bonjour").await;
    let mut ws = connect_authenticated(host.handle.port()).await;

    // WHEN: Saving a target language, then reading preferences back
    send_json(
        &mut ws,
        &json!({ "id": 20, "action": "savePreferences", "targetLang": "German" }),
    )
    .await;
    let saved = receive_json(&mut ws).await;

    send_json(&mut ws, &json!({ "id": 21, "action": "getPreferences" })).await;
    let read = receive_json(&mut ws).await;

    // THEN: The save is acknowledged and the view only says a key exists
    assert_eq!(saved, json!({ "id": 20, "ok": true }));
    assert_eq!(read["preferences"]["targetLang"], json!("German"));
    assert_eq!(read["preferences"]["hasApiKey"], json!(true));
    assert!(read["preferences"].get("apiKey").is_none());
}

/// **VALUE**: Verifies `shutdown` stops accepting new connections.
///
/// **BUG THIS CATCHES**: Would catch a handle whose shutdown only logs.
#[tokio::test]
async fn given_running_server_when_shutdown_then_new_connections_fail() {
    // GIVEN: A running server
    let host = start_test_host("Bonjour").await;
    let port = host.handle.port();
    assert!(host.handle.is_running());

    // WHEN: Shutting down
    host.handle.shutdown();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // THEN: The listener is gone
    assert!(!host.handle.is_running());
    let result = connect_async(format!("ws://127.0.0.1:{}", port)).await;
    assert!(result.is_err());
}
