//! Web hosting module (Axum + WebSocket transport).

pub mod server;
pub mod ws;

pub use server::run_server;
