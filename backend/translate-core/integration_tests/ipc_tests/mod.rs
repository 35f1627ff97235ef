pub mod helpers;
mod server;
