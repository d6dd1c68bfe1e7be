//! pairchat library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod web;

pub use cli::Commands;
pub use config::{Settings, ValidationMode};
pub use crate::core::{ConversationStore, EngineHandle, IdentityRegistry, Router};
pub use error::{Error, Result};
pub use protocol::{Channel, ChannelHandle, ClientEvent, ServerEvent};
pub use web::run_server;
