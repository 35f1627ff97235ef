//! Per-tab translation overlay.
//!
//! ```text
//!            Requested                Succeeded
//!   Absent ------------> Loading ------------------> ShowingResult
//!     ^                    |  \        Failed
//!     |    Dismissed       |   `-------------------> ShowingError
//!     `--------------------+-------------------------------'
//! ```
//!
//! `Requested` is accepted from every state and replaces whatever was shown.
//! `Succeeded` and `Failed` only land while loading the same request, so a
//! translation that finishes after the user dismissed the overlay, or after a
//! newer selection replaced it, is dropped.

use serde::Serialize;

pub const TRANSLATION_TITLE: &str = "AI Translation";
pub const ERROR_TITLE: &str = "Translation Error";
pub const LOADING_CONTENT: &str = "Translating...";

/// Per-tab sequence number of an overlay request.
pub type RequestId = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Absent,
    Loading {
        request: RequestId,
        original: String,
    },
    ShowingResult {
        original: String,
        translation: String,
    },
    ShowingError {
        original: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Requested {
        request: RequestId,
        original: String,
    },
    Succeeded {
        request: RequestId,
        translation: String,
    },
    Failed {
        request: RequestId,
        message: String,
    },
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Loading,
    Translation,
    Error,
}

/// What the UI renders for a visible overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub title: &'static str,
    pub original: String,
    pub content: String,
}

impl OverlayState {
    /// Next state for `event`. Events that do not apply leave the state unchanged.
    pub fn apply(self, event: OverlayEvent) -> Self {
        match (self, event) {
            (_, OverlayEvent::Requested { request, original }) => {
                OverlayState::Loading { request, original }
            }
            (_, OverlayEvent::Dismissed) => OverlayState::Absent,
            (
                OverlayState::Loading { request, original },
                OverlayEvent::Succeeded {
                    request: finished,
                    translation,
                },
            ) if request == finished => OverlayState::ShowingResult {
                original,
                translation,
            },
            (
                OverlayState::Loading { request, original },
                OverlayEvent::Failed {
                    request: finished,
                    message,
                },
            ) if request == finished => OverlayState::ShowingError { original, message },
            (state, _) => state,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, OverlayState::Absent)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, OverlayState::Loading { .. })
    }

    /// Render data, or `None` while absent.
    pub fn view(&self) -> Option<OverlayView> {
        let view = match self {
            OverlayState::Absent => return None,
            OverlayState::Loading { original, .. } => OverlayView {
                kind: OverlayKind::Loading,
                title: TRANSLATION_TITLE,
                original: original.clone(),
                content: LOADING_CONTENT.to_string(),
            },
            OverlayState::ShowingResult {
                original,
                translation,
            } => OverlayView {
                kind: OverlayKind::Translation,
                title: TRANSLATION_TITLE,
                original: original.clone(),
                content: translation.clone(),
            },
            OverlayState::ShowingError { original, message } => OverlayView {
                kind: OverlayKind::Error,
                title: ERROR_TITLE,
                original: original.clone(),
                content: message.clone(),
            },
        };

        Some(view)
    }
}
