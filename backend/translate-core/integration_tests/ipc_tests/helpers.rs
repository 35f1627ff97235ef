//! Test helpers for IPC integration tests.
//!
//! - starting a server on an ephemeral port, backed by a mock provider
//! - sending and receiving JSON frames
//! - authentication and connection state checks

use crate::gemini_tests::helpers::{TEST_API_KEY, generate_path, success_body};

use translate_core::config::Preferences;
use translate_core::gemini::GeminiClient;
use translate_core::ipc::{
    HostState, IpcServerConfig, IpcServerHandle, PreferenceStore, start_ipc_server,
};
use translate_core::model_list::ModelList;
use translate_core::pipeline::{PipelineSettings, TranslationPipeline};
use translate_core::session::SessionRegistry;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test constants for authentication
pub const TEST_AUTH_TOKEN: &str = "test-token-12345";

/// A running server plus the mock provider behind it.
pub struct TestHost {
    pub handle: IpcServerHandle,
    pub provider: MockServer,
}

/// Start a server on port 0 whose first model always answers `translation`.
pub async fn start_test_host(translation: &str) -> TestHost {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-2.5-flash")))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(translation)))
        .mount(&provider)
        .await;

    let client = GeminiClient::new(&provider.uri()).expect("mock server uri is a valid base url");
    let pipeline = TranslationPipeline::new(
        client,
        ModelList::default(),
        PipelineSettings::default(),
    );
    let preferences = PreferenceStore::in_memory(Preferences {
        api_key: Some(TEST_API_KEY.to_string()),
        ..Preferences::default()
    });
    let state = HostState::new(pipeline, SessionRegistry::default(), preferences);

    let handle = start_ipc_server(
        IpcServerConfig::new(0).with_auth_token(TEST_AUTH_TOKEN),
        state,
    )
    .await
    .expect("Failed to start IPC server");

    TestHost { handle, provider }
}

/// Test helper: Connect to IPC server and return WebSocket stream.
pub async fn connect_to_server(ipc_port: u16) -> TestSocket {
    let url = format!("ws://127.0.0.1:{}", ipc_port);
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to WebSocket server");
    ws_stream
}

/// Test helper: Send a JSON value as a text frame.
pub async fn send_json(ws: &mut TestSocket, message: &Value) {
    ws.send(Message::Text(message.to_string().into()))
        .await
        .expect("Failed to send message");
}

/// Test helper: Receive the next text frame and parse it as JSON.
pub async fn receive_json(ws: &mut TestSocket) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timed out waiting for a message")
        .expect("No message received")
        .expect("Error receiving message");

    let text = msg.to_text().expect("Expected a text frame");
    serde_json::from_str(text).expect("Failed to parse JSON frame")
}

/// Test helper: Send the auth frame and return the `authenticated` flag.
pub async fn authenticate(ws: &mut TestSocket, token: &str) -> bool {
    send_json(ws, &serde_json::json!({ "id": 1, "action": "auth", "token": token })).await;

    let response = receive_json(ws).await;
    response["authenticated"]
        .as_bool()
        .expect("Expected an authenticated reply")
}

/// Test helper: Connect and authenticate with the test token.
pub async fn connect_authenticated(ipc_port: u16) -> TestSocket {
    let mut ws = connect_to_server(ipc_port).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await, "auth should succeed");
    ws
}

/// Test helper: Check if WebSocket connection is closed.
pub async fn is_connection_closed(ws: &mut TestSocket) -> bool {
    match tokio::time::timeout(Duration::from_millis(100), ws.next()).await {
        Ok(None) => true,
        Ok(Some(Err(_))) => true,
        Ok(Some(Ok(Message::Close(_)))) => true,
        Ok(Some(Ok(_))) => false,
        Err(_) => false,
    }
}
