//! Typed event protocol for the chat relay.
//!
//! Wire format is a JSON text frame of the shape
//! `{"event": <name>, "data": <payload>}`. Inbound frames are decoded
//! into [`ClientEvent`] at the transport boundary; everything past that
//! point works with the closed set of variants below.

use serde::{Deserialize, Serialize};

use crate::core::conversation::{ConversationView, Message};

/// Events clients send to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Announce an identity for this connection.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join { user_id: String },

    /// Request every conversation the identity participates in.
    #[serde(rename = "chat-list", rename_all = "camelCase")]
    ChatList { user_id: String },

    /// Explicitly open a conversation with a counterpart.
    #[serde(rename = "create-chat", rename_all = "camelCase")]
    CreateChat {
        user_id: String,
        receiver_id: String,
    },

    /// Send a message to another identity.
    #[serde(rename = "add-message")]
    AddMessage {
        sender: String,
        receiver: String,
        body: String,
    },
}

impl ClientEvent {
    /// Check required fields for content, not just presence.
    ///
    /// Decoding already rejects frames with missing fields; this catches
    /// fields that are present but blank after trimming.
    pub fn validate(&self) -> Result<(), String> {
        fn filled(value: &str, what: &str) -> Result<(), String> {
            if value.trim().is_empty() {
                Err(format!("{} must not be empty", what))
            } else {
                Ok(())
            }
        }

        match self {
            ClientEvent::Join { user_id } => filled(user_id, "userId"),
            ClientEvent::ChatList { user_id } => filled(user_id, "userId"),
            ClientEvent::CreateChat {
                user_id,
                receiver_id,
            } => {
                filled(user_id, "userId")?;
                filled(receiver_id, "receiverId")
            }
            ClientEvent::AddMessage {
                sender,
                receiver,
                body,
            } => {
                filled(sender, "sender")?;
                filled(receiver, "receiver")?;
                filled(body, "body")
            }
        }
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::ChatList { .. } => "chat-list",
            ClientEvent::CreateChat { .. } => "create-chat",
            ClientEvent::AddMessage { .. } => "add-message",
        }
    }
}

/// Delivery direction marker on an `add-message-response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Confirmation to the author.
    #[serde(rename = "Sent!")]
    Sent,
    /// Notification to the counterpart.
    #[serde(rename = "Received!")]
    Received,
}

/// Message payload carried by an `add-message-response`.
///
/// `contact` is the other party from the recipient's point of view;
/// `owner` is always the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub body: String,
    pub contact: String,
    pub owner: String,
}

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "join-response")]
    JoinResponse { status: String },

    #[serde(rename = "chat-list-response")]
    ChatListResponse(Vec<ConversationView>),

    #[serde(rename = "create-chat-response")]
    CreateChatResponse(ConversationView),

    #[serde(rename = "add-message-response")]
    AddMessageResponse {
        status: DeliveryStatus,
        data: MessagePayload,
    },

    /// Validation failure report (strict mode only).
    #[serde(rename = "error-response")]
    ErrorResponse { reason: String },
}

impl ServerEvent {
    /// Join acknowledgement.
    pub fn join_ok() -> Self {
        ServerEvent::JoinResponse {
            status: "Success!".to_string(),
        }
    }

    /// Sender-side confirmation for a delivered message.
    pub fn sent(message: &Message, receiver: impl Into<String>) -> Self {
        ServerEvent::AddMessageResponse {
            status: DeliveryStatus::Sent,
            data: MessagePayload {
                body: message.body.clone(),
                contact: receiver.into(),
                owner: message.owner.clone(),
            },
        }
    }

    /// Receiver-side notification for a delivered message.
    pub fn received(message: &Message) -> Self {
        ServerEvent::AddMessageResponse {
            status: DeliveryStatus::Received,
            data: MessagePayload {
                body: message.body.clone(),
                contact: message.owner.clone(),
                owner: message.owner.clone(),
            },
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        ServerEvent::ErrorResponse {
            reason: reason.into(),
        }
    }
}
