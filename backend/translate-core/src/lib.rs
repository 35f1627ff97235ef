pub mod config;
pub mod error;
pub mod gemini;
pub mod ipc;
pub mod model_list;
pub mod pipeline;
pub mod session;

#[cfg(test)]
mod tests;

pub const GEMINI_API_HOST: &str = "generativelanguage.googleapis.com";
pub const GEMINI_API_BASE_URL: &str =
    const_format::concatcp!("https://", GEMINI_API_HOST, "/v1beta");

pub const IPC_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_IPC_PORT: u16 = 19876;

/// Longest source text accepted from the UI, in characters.
pub const MAX_SOURCE_CHARS: usize = 4000;

pub const DEFAULT_TARGET_LANGUAGE: &str = "English";
