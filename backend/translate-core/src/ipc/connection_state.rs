//! Per-connection authentication state.

use std::net::SocketAddr;

pub(crate) struct ConnectionState {
    peer: SocketAddr,
    authenticated: bool,
    expected_token: String,
    handled: u64,
}

impl ConnectionState {
    pub(crate) fn new(peer: SocketAddr, token: String) -> Self {
        Self {
            peer,
            authenticated: false,
            expected_token: token,
            handled: 0,
        }
    }

    /// Validate token and mark as authenticated if correct.
    ///
    /// An empty token never matches.
    pub(crate) fn validate_token(&mut self, token: &str) -> bool {
        if !token.is_empty() && token == self.expected_token {
            self.authenticated = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) fn record_request(&mut self) {
        self.handled += 1;
    }

    pub(crate) fn handled(&self) -> u64 {
        self.handled
    }
}
