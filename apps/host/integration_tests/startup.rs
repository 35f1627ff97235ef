use translate_host::startup::start_host;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_AUTH_TOKEN: &str = "host-test-token";

type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn send_json(ws: &mut TestSocket, message: Value) {
    ws.send(Message::Text(message.to_string().into()))
        .await
        .expect("Failed to send message");
}

async fn receive_json(ws: &mut TestSocket) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timed out waiting for a message")
        .expect("No message received")
        .expect("Error receiving message");
    serde_json::from_str(msg.to_text().expect("Expected a text frame"))
        .expect("Failed to parse JSON frame")
}

/// **VALUE**: End-to-end check of the host wiring: config file, preferences on disk,
/// pipeline, router, and persistence of the last translation.
///
/// **WHY THIS MATTERS**: Each piece is unit tested; this is the only test that proves the
/// binary hands the configured base URL, model chain and config directory to them.
///
/// **BUG THIS CATCHES**: Would catch the host ignoring `[api] base_url` or `[[models]]`,
/// or creating the preference store without a directory so nothing is saved.
#[tokio::test]
async fn given_config_dir_when_host_started_then_translates_and_persists_last_result() {
    // GIVEN: A provider that only knows one model and one key
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/custom-flash:generateContent"))
        .and(query_param("key", "stored-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": { "parts": [{ "text": "Guten Morgen" }] }
            }]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    // AND: A config dir pointing at it, with a stored key
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("translator.toml"),
        format!(
            "[api]\nbase_url = \"{}\"\n\n[[models]]\nid = \"custom-flash\"\n",
            provider.uri()
        ),
    )
    .expect("Failed to write config");
    std::fs::write(
        dir.path().join("preferences.json"),
        r#"{ "apiKey": "stored-key", "targetLang": "German" }"#,
    )
    .expect("Failed to write preferences");

    let handle = start_host(dir.path(), Some(TEST_AUTH_TOKEN.to_string()), Some(0))
        .await
        .expect("Host should start");

    // WHEN: A client authenticates and asks for a translation with the stored target
    let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{}", handle.port()))
        .await
        .expect("Failed to connect to WebSocket server");
    send_json(&mut ws, json!({ "action": "auth", "token": TEST_AUTH_TOKEN })).await;
    assert_eq!(receive_json(&mut ws).await["authenticated"], json!(true));

    send_json(
        &mut ws,
        json!({ "id": 2, "action": "translateText", "text": "Good morning" }),
    )
    .await;
    let response = receive_json(&mut ws).await;

    // THEN: The configured model answered
    assert_eq!(response, json!({ "id": 2, "result": "Guten Morgen" }));

    // AND: The result reaches preferences.json
    let mut saved = Value::Null;
    for _ in 0..50 {
        let contents = std::fs::read_to_string(dir.path().join("preferences.json"))
            .expect("preferences file exists");
        saved = serde_json::from_str(&contents).expect("preferences are JSON");
        if saved["lastResult"] == json!("Guten Morgen") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(saved["lastResult"], json!("Guten Morgen"));
    assert_eq!(saved["lastTargetLang"], json!("German"));
    assert_eq!(saved["apiKey"], json!("stored-key"));

    handle.shutdown();
}
