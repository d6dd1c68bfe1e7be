//! Wire protocol for the chat relay.
//!
//! This module defines the boundary between transports and the engine:
//! - Typed inbound/outbound event variants with their JSON wire shapes
//! - The channel abstraction used to address one live connection

pub mod channel;
pub mod events;

pub use channel::{Channel, ChannelHandle};
pub use events::{ClientEvent, DeliveryStatus, MessagePayload, ServerEvent};
