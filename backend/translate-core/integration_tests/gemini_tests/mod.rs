mod client;
mod fallback;
pub mod helpers;
