pub mod backend;
pub mod config;
pub mod ipc;
pub mod translation;

pub use backend::BackendError;
pub use config::ConfigError;
pub use ipc::IpcError;
pub use translation::TranslationError;
