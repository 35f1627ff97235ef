//! Handle to a running IPC server.

use std::net::SocketAddr;

use log::info;
use tokio::task::JoinHandle;

/// Returned by [`start_ipc_server`](crate::ipc::start_ipc_server).
///
/// Dropping the handle leaves the server running; call [`shutdown`](Self::shutdown)
/// to stop accepting connections. Connections already accepted finish on their own.
pub struct IpcServerHandle {
    local_addr: SocketAddr,
    auth_token: String,
    accept_task: JoinHandle<()>,
}

impl IpcServerHandle {
    pub(crate) fn new(local_addr: SocketAddr, auth_token: String, accept_task: JoinHandle<()>) -> Self {
        Self {
            local_addr,
            auth_token,
            accept_task,
        }
    }

    /// Bound address. With port 0 this carries the port the OS picked.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Token clients must send in their `auth` frame.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn is_running(&self) -> bool {
        !self.accept_task.is_finished()
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        self.accept_task.abort();
        info!("IPC server on {} stopped accepting connections", self.local_addr);
    }
}
