//! Per-tab interaction state.
//!
//! A [`SessionContext`] exists for a tab from its first context-menu click
//! until the tab closes. It holds the click debounce timestamp, whether the
//! overlay has been injected into the page, and the overlay state machine.

pub mod overlay;

pub use overlay::{OverlayEvent, OverlayKind, OverlayState, OverlayView, RequestId};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

/// Browser tab identifier.
pub type TabId = i64;

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    last_click: Option<Instant>,
    overlay_injected: bool,
    /// Last request id handed out for this tab.
    last_request: RequestId,
    overlay: OverlayState,
}

impl SessionContext {
    pub fn last_click(&self) -> Option<Instant> {
        self.last_click
    }

    pub fn overlay_injected(&self) -> bool {
        self.overlay_injected
    }

    pub fn last_request(&self) -> RequestId {
        self.last_request
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }
}

#[derive(Debug)]
pub struct SessionRegistry {
    debounce: Duration,
    contexts: HashMap<TabId, SessionContext>,
}

impl SessionRegistry {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            contexts: HashMap::new(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a click on `tab` at `now`.
    ///
    /// Returns `false` (and records nothing) when the previous accepted click
    /// on the same tab is less than the debounce window old.
    pub fn register_click(&mut self, tab: TabId, now: Instant) -> bool {
        let context = self.contexts.entry(tab).or_default();

        if let Some(last) = context.last_click
            && now.saturating_duration_since(last) < self.debounce
        {
            debug!("Tab {tab}: click within {:?} debounce, ignored", self.debounce);
            return false;
        }

        context.last_click = Some(now);
        true
    }

    /// Returns `true` the first time it is called for a tab.
    pub fn mark_overlay_injected(&mut self, tab: TabId) -> bool {
        let context = self.contexts.entry(tab).or_default();
        let first = !context.overlay_injected;
        context.overlay_injected = true;
        first
    }

    /// Start loading a new overlay request for `original`, superseding any
    /// request still in flight.
    ///
    /// Returns the id the result must carry, or `None` for a tab without a
    /// context.
    pub fn begin_request(&mut self, tab: TabId, original: impl Into<String>) -> Option<RequestId> {
        let context = self.contexts.get_mut(&tab)?;
        context.last_request += 1;
        let request = context.last_request;

        let current = std::mem::take(&mut context.overlay);
        context.overlay = current.apply(OverlayEvent::Requested {
            request,
            original: original.into(),
        });
        Some(request)
    }

    /// Feed `event` to the tab's overlay and return the resulting state.
    ///
    /// Returns `None` for a tab without a context (never clicked, or closed
    /// since); the event is dropped.
    pub fn transition(&mut self, tab: TabId, event: OverlayEvent) -> Option<&OverlayState> {
        let context = self.contexts.get_mut(&tab)?;
        let current = std::mem::take(&mut context.overlay);
        context.overlay = current.apply(event);
        Some(&context.overlay)
    }

    pub fn get(&self, tab: TabId) -> Option<&SessionContext> {
        self.contexts.get(&tab)
    }

    pub fn overlay(&self, tab: TabId) -> Option<&OverlayState> {
        self.contexts.get(&tab).map(SessionContext::overlay)
    }

    /// Drop everything known about `tab`. Returns whether a context existed.
    pub fn close(&mut self, tab: TabId) -> bool {
        self.contexts.remove(&tab).is_some()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
