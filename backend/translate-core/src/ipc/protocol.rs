//! JSON frames exchanged with the extension UI.
//!
//! Client → server: `{ "id": 7, "action": "translateText", "text": "...", "targetLang": "French" }`.
//! Server → client: `{ "id": 7, "result": "..." }`, `{ "id": 7, "error": "..." }`, and so on.
//! The `id` is echoed back so the UI can correlate replies.

use crate::DEFAULT_TARGET_LANGUAGE;
use crate::config::{PreferenceUpdate, Preferences, resolve_credential};
use crate::session::{OverlayView, TabId};

use serde::{Deserialize, Serialize};

/// Id used for frames that cannot be correlated to a request.
pub const UNCORRELATED_ID: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub id: u64,
    #[serde(flatten)]
    pub request: ClientRequest,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientRequest {
    Auth {
        token: String,
    },
    Wake,
    TranslateText {
        text: String,
        #[serde(default)]
        target_lang: Option<String>,
    },
    ContextMenuClick {
        tab_id: TabId,
        #[serde(default)]
        selection_text: String,
    },
    DismissOverlay {
        tab_id: TabId,
    },
    TabClosed {
        tab_id: TabId,
    },
    GetPreferences,
    SavePreferences {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        target_lang: Option<String>,
        #[serde(default)]
        last_input: Option<String>,
    },
}

impl std::fmt::Debug for ClientRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens and keys stay out of logs.
        match self {
            ClientRequest::Auth { .. } => write!(f, "Auth"),
            ClientRequest::SavePreferences { .. } => write!(f, "SavePreferences"),
            other => write!(f, "{}", other.action()),
        }
    }
}

impl ClientRequest {
    pub fn action(&self) -> &'static str {
        match self {
            ClientRequest::Auth { .. } => "auth",
            ClientRequest::Wake => "wake",
            ClientRequest::TranslateText { .. } => "translateText",
            ClientRequest::ContextMenuClick { .. } => "contextMenuClick",
            ClientRequest::DismissOverlay { .. } => "dismissOverlay",
            ClientRequest::TabClosed { .. } => "tabClosed",
            ClientRequest::GetPreferences => "getPreferences",
            ClientRequest::SavePreferences { .. } => "savePreferences",
        }
    }
}

impl ClientMessage {
    /// Parse a text frame.
    ///
    /// On failure the returned id is the frame's `id` when one could be read,
    /// [`UNCORRELATED_ID`] otherwise.
    pub fn parse(text: &str) -> Result<Self, (u64, serde_json::Error)> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| (UNCORRELATED_ID, e))?;
        let id = value
            .get("id")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(UNCORRELATED_ID);

        serde_json::from_value(value).map_err(|e| (id, e))
    }
}

/// Preferences as shown to the UI. The API key itself is never sent back.
///
/// `has_api_key` is true when a translation would have a key, stored or from
/// `GEMINI_API_KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesView {
    pub has_api_key: bool,
    pub target_lang: String,
    pub last_input: Option<String>,
    pub last_result: Option<String>,
    pub last_target_lang: Option<String>,
}

impl From<&Preferences> for PreferencesView {
    fn from(preferences: &Preferences) -> Self {
        Self {
            has_api_key: resolve_credential(preferences).is_present(),
            target_lang: preferences
                .target_lang
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()),
            last_input: preferences.last_input.clone(),
            last_result: preferences.last_result.clone(),
            last_target_lang: preferences.last_target_lang.clone(),
        }
    }
}

/// Build the store update for a `savePreferences` request.
pub fn preference_update(
    api_key: Option<String>,
    target_lang: Option<String>,
    last_input: Option<String>,
) -> PreferenceUpdate {
    PreferenceUpdate {
        api_key,
        target_lang: target_lang.filter(|lang| !lang.trim().is_empty()),
        last_input,
        ..PreferenceUpdate::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerMessage {
    pub id: u64,
    #[serde(flatten)]
    pub body: ServerBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerBody {
    Authenticated { authenticated: bool },
    Result { result: String },
    Error { error: String },
    Overlay { overlay: OverlayView },
    Ignored { ignored: bool },
    Ok { ok: bool },
    Preferences { preferences: PreferencesView },
}

impl ServerMessage {
    pub fn authenticated(success: bool) -> Self {
        Self {
            id: UNCORRELATED_ID,
            body: ServerBody::Authenticated {
                authenticated: success,
            },
        }
    }

    pub fn result(id: u64, result: impl Into<String>) -> Self {
        Self {
            id,
            body: ServerBody::Result {
                result: result.into(),
            },
        }
    }

    pub fn error(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            body: ServerBody::Error {
                error: error.into(),
            },
        }
    }

    pub fn overlay(id: u64, overlay: OverlayView) -> Self {
        Self {
            id,
            body: ServerBody::Overlay { overlay },
        }
    }

    pub fn ignored(id: u64) -> Self {
        Self {
            id,
            body: ServerBody::Ignored { ignored: true },
        }
    }

    pub fn ok(id: u64) -> Self {
        Self {
            id,
            body: ServerBody::Ok { ok: true },
        }
    }

    pub fn preferences(id: u64, preferences: PreferencesView) -> Self {
        Self {
            id,
            body: ServerBody::Preferences { preferences },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, ServerBody::Error { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
