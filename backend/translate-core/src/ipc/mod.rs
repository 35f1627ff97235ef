//! Localhost message router between the extension UI and the pipeline.
//!
//! - WebSocket server bound to `127.0.0.1`; non-loopback peers are dropped
//! - JSON text frames (see [`protocol`])
//! - the first frame must be an `auth` frame carrying the server's token

mod connection_state;
mod handle;
pub mod preference_store;
pub mod protocol;
mod server;
mod state;

pub use handle::IpcServerHandle;
pub use preference_store::{PreferenceCommand, PreferenceStore};
pub use protocol::{ClientMessage, ClientRequest, PreferencesView, ServerBody, ServerMessage};
pub use server::{IpcServerConfig, TEXT_TOO_LONG_MESSAGE, route, start_ipc_server};
pub use state::HostState;
