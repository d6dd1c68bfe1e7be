//! Core module - registry, conversations, routing, and dispatch.
//!
//! This module contains the heart of pairchat's relay engine:
//! - Identity↔connection registry
//! - Pairwise conversation store
//! - The message router and its lifecycle policy
//! - The serialized engine dispatcher

pub mod conversation;
pub mod engine;
pub mod registry;
pub mod router;

pub use conversation::{Conversation, ConversationStore, ConversationView, Message};
pub use engine::{EngineCommand, EngineHandle};
pub use registry::IdentityRegistry;
pub use router::Router;
