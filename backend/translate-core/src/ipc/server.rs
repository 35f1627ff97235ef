//! IPC WebSocket server.
//!
//! # Security
//!
//! - Binds to `127.0.0.1` only and drops non-loopback peers silently
//! - The first frame must be `{ "action": "auth", "token": "..." }`; a wrong
//!   token or any other first frame is answered with `authenticated: false`
//!   and the connection is closed
//!
//! # Ordering
//!
//! Frames of one connection are handled one after the other, so a connection
//! never has two translations in flight. Separate connections run concurrently
//! and share the pipeline, the session registry and the preference store.

use crate::config::{PreferenceUpdate, Preferences, resolve_credential};
use crate::error::ipc::IpcError;
use crate::error::translation::EMPTY_TEXT_MESSAGE;
use crate::gemini::GenerationBackend;
use crate::ipc::connection_state::ConnectionState;
use crate::ipc::handle::IpcServerHandle;
use crate::ipc::protocol::{
    ClientMessage, ClientRequest, PreferencesView, ServerMessage, preference_update,
};
use crate::ipc::state::HostState;
use crate::pipeline::TranslationRequest;
use crate::session::{OverlayEvent, TabId};
use crate::{DEFAULT_IPC_PORT, DEFAULT_TARGET_LANGUAGE, IPC_HOSTNAME, MAX_SOURCE_CHARS};

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;
use std::time::Instant;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use uuid::Uuid;

pub const TEXT_TOO_LONG_MESSAGE: &str =
    const_format::formatcp!("Text too long (max {} chars)", MAX_SOURCE_CHARS);

const ALREADY_AUTHENTICATED_MESSAGE: &str = "Already authenticated";
const SAVE_FAILED_MESSAGE: &str = "Failed to save preferences";

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

#[derive(Debug, Clone)]
pub struct IpcServerConfig {
    /// Port on `127.0.0.1`; `0` lets the OS pick one.
    pub port: u16,
    /// Token clients must present. Generated when `None`.
    pub auth_token: Option<String>,
}

impl IpcServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

impl Default for IpcServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IPC_PORT)
    }
}

/// Bind the router and start accepting connections in the background.
///
/// # Errors
///
/// Returns [`IpcError::Io`] if the port cannot be bound.
pub async fn start_ipc_server<B>(
    config: IpcServerConfig,
    state: HostState<B>,
) -> Result<IpcServerHandle, IpcError>
where
    B: GenerationBackend + 'static,
{
    let auth_token = config
        .auth_token
        .filter(|token| !token.trim().is_empty())
        .unwrap_or_else(|| {
            let token = Uuid::new_v4().to_string();
            info!("Generated IPC auth token: {}", token);
            token
        });

    let listener = TcpListener::bind((IPC_HOSTNAME, config.port)).await?;
    let local_addr = listener.local_addr()?;

    info!("IPC server listening on {}", local_addr);

    let token = auth_token.clone();
    let accept_task = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("Client connecting from {}", addr);
                    let token = token.clone();
                    let state = state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, token, state).await {
                            warn!("Connection {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => error!("Failed to accept IPC connection: {}", e),
            }
        }
    });

    Ok(IpcServerHandle::new(local_addr, auth_token, accept_task))
}

async fn handle_connection<B: GenerationBackend>(
    stream: TcpStream,
    addr: SocketAddr,
    auth_token: String,
    state: HostState<B>,
) -> Result<(), IpcError> {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {}", addr);
        return Ok(());
    }

    let ws_stream = accept_async(stream).await.map_err(|e| IpcError::Handshake {
        message: format!("WebSocket handshake failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (mut write, mut read) = ws_stream.split();
    let mut connection = ConnectionState::new(addr, auth_token);

    let Some(first) = read.next().await else {
        debug!("Client {} disconnected before sending auth", addr);
        return Ok(());
    };

    let token = match first {
        Ok(Message::Text(text)) => match ClientMessage::parse(text.as_str()) {
            Ok(ClientMessage {
                request: ClientRequest::Auth { token },
                ..
            }) => Some(token),
            _ => None,
        },
        Ok(_) => None,
        Err(e) => {
            return Err(IpcError::Read {
                message: format!("Error reading first message: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    let authenticated = token.is_some_and(|token| connection.validate_token(&token));
    send_message(&mut write, &ServerMessage::authenticated(authenticated)).await?;

    if !authenticated {
        warn!("Client {} failed authentication", addr);
        if let Err(e) = write.close().await {
            debug!("Closing {} after failed auth: {}", addr, e);
        }
        return Ok(());
    }

    info!("Client {} authenticated", connection.peer());

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let response = match ClientMessage::parse(text.as_str()) {
                    Ok(message) => {
                        debug!(
                            "Client {} -> #{} {:?}",
                            connection.peer(),
                            message.id,
                            message.request
                        );
                        route(&state, message).await
                    }
                    Err((id, e)) => {
                        warn!("Invalid message from {}: {}", connection.peer(), e);
                        ServerMessage::error(id, format!("Invalid message: {e}"))
                    }
                };

                if response.is_error() {
                    debug!("Client {} <- #{} error", connection.peer(), response.id);
                }

                connection.record_request();
                send_message(&mut write, &response).await?;
            }
            Ok(Message::Binary(_)) => {
                debug!("Ignoring binary frame from {}", connection.peer());
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(IpcError::Read {
                    message: format!("Error reading message: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }

    info!(
        "Client {} disconnected after {} request(s)",
        connection.peer(),
        connection.handled()
    );
    Ok(())
}

async fn send_message(write: &mut WsSink, message: &ServerMessage) -> Result<(), IpcError> {
    let json = message.to_json()?;

    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| IpcError::Send {
            message: format!("Failed to send response: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Answer one authenticated request.
pub async fn route<B: GenerationBackend>(
    state: &HostState<B>,
    message: ClientMessage,
) -> ServerMessage {
    let id = message.id;

    match message.request {
        ClientRequest::Auth { .. } => ServerMessage::error(id, ALREADY_AUTHENTICATED_MESSAGE),
        ClientRequest::Wake => ServerMessage::ok(id),
        ClientRequest::TranslateText { text, target_lang } => {
            handle_translate_text(state, id, &text, target_lang).await
        }
        ClientRequest::ContextMenuClick {
            tab_id,
            selection_text,
        } => handle_context_menu_click(state, id, tab_id, &selection_text).await,
        ClientRequest::DismissOverlay { tab_id } => {
            state
                .sessions()
                .lock()
                .await
                .transition(tab_id, OverlayEvent::Dismissed);
            debug!("Tab {tab_id}: overlay dismissed");
            ServerMessage::ok(id)
        }
        ClientRequest::TabClosed { tab_id } => {
            if state.sessions().lock().await.close(tab_id) {
                debug!("Tab {tab_id}: session removed");
            }
            ServerMessage::ok(id)
        }
        ClientRequest::GetPreferences => {
            let preferences = state.preferences().snapshot().await;
            ServerMessage::preferences(id, PreferencesView::from(&preferences))
        }
        ClientRequest::SavePreferences {
            api_key,
            target_lang,
            last_input,
        } => {
            let update = preference_update(api_key, target_lang, last_input);
            match state.preferences().update(update).await {
                Ok(()) => ServerMessage::ok(id),
                Err(e) => {
                    error!("Failed to save preferences: {e}");
                    ServerMessage::error(id, SAVE_FAILED_MESSAGE)
                }
            }
        }
    }
}

/// Popup translation. A success is remembered as `lastResult`.
async fn handle_translate_text<B: GenerationBackend>(
    state: &HostState<B>,
    id: u64,
    text: &str,
    target_lang: Option<String>,
) -> ServerMessage {
    let text = match checked_source(text) {
        Ok(text) => text,
        Err(message) => return ServerMessage::error(id, message),
    };

    let preferences = state.preferences().snapshot().await;
    let target = target_language(target_lang, &preferences);
    let request = TranslationRequest::new(text, target.as_str(), resolve_credential(&preferences));

    match state.pipeline().translate(&request).await {
        Ok(translation) => {
            let update = PreferenceUpdate::last_translation(&translation, &target);
            if let Err(e) = state.preferences().update(update).await {
                error!("Failed to remember last result: {e}");
            }
            ServerMessage::result(id, translation)
        }
        Err(e) => {
            warn!("Translation failed [{}]: {}", e.error_category(), e);
            ServerMessage::error(id, e.user_message())
        }
    }
}

/// Selection translation shown in the tab's overlay.
async fn handle_context_menu_click<B: GenerationBackend>(
    state: &HostState<B>,
    id: u64,
    tab_id: TabId,
    selection_text: &str,
) -> ServerMessage {
    let selection = selection_text.trim();
    if selection.is_empty() {
        debug!("Tab {tab_id}: empty selection, ignored");
        return ServerMessage::ignored(id);
    }

    let request = {
        let mut sessions = state.sessions().lock().await;
        if !sessions.register_click(tab_id, Instant::now()) {
            return ServerMessage::ignored(id);
        }
        if sessions.mark_overlay_injected(tab_id) {
            debug!("Tab {tab_id}: overlay injected");
        }
        match sessions.begin_request(tab_id, selection) {
            Some(request) => request,
            None => return ServerMessage::ignored(id),
        }
    };

    let event = match checked_source(selection) {
        Ok(text) => {
            let preferences = state.preferences().snapshot().await;
            let target = target_language(None, &preferences);
            let translation_request =
                TranslationRequest::new(text, target.as_str(), resolve_credential(&preferences));

            match state.pipeline().translate(&translation_request).await {
                Ok(translation) => OverlayEvent::Succeeded {
                    request,
                    translation,
                },
                Err(e) => {
                    warn!("Tab {tab_id}: translation failed [{}]: {}", e.error_category(), e);
                    OverlayEvent::Failed {
                        request,
                        message: e.user_message(),
                    }
                }
            }
        }
        Err(message) => OverlayEvent::Failed {
            request,
            message: message.to_string(),
        },
    };

    let view = {
        let mut sessions = state.sessions().lock().await;
        let current = sessions
            .get(tab_id)
            .is_some_and(|context| context.last_request() == request);
        match sessions.transition(tab_id, event) {
            Some(overlay) if current && !overlay.is_loading() => overlay.view(),
            _ => None,
        }
    };

    match view {
        Some(view) => ServerMessage::overlay(id, view),
        None => {
            debug!("Tab {tab_id}: request #{request} superseded or dismissed before it finished");
            ServerMessage::ignored(id)
        }
    }
}

/// Trimmed source text within the accepted length, or the message for the UI.
fn checked_source(text: &str) -> Result<&str, &'static str> {
    let text = text.trim();

    if text.is_empty() {
        return Err(EMPTY_TEXT_MESSAGE);
    }

    if text.chars().count() > MAX_SOURCE_CHARS {
        return Err(TEXT_TOO_LONG_MESSAGE);
    }

    Ok(text)
}

fn target_language(requested: Option<String>, preferences: &Preferences) -> String {
    requested
        .filter(|lang| !lang.trim().is_empty())
        .or_else(|| {
            preferences
                .target_lang
                .clone()
                .filter(|lang| !lang.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string())
}
