//! Message routing for pairchat.
//!
//! Handles:
//! - Identity registration on join, removal on disconnect
//! - Conversation lifecycle (explicit create vs implicit first message)
//! - Deciding which connections receive which outbound events

use crate::config::ValidationMode;
use crate::core::conversation::{ConversationStore, ConversationView, Message};
use crate::core::registry::IdentityRegistry;
use crate::protocol::{Channel, ChannelHandle, ClientEvent, ServerEvent};

/// Conversation state for an identity pair, as seen before an event is
/// applied. Tracked implicitly via conversation existence and log
/// emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairState {
    /// No conversation record exists.
    None,
    /// Conversation exists with zero messages (explicit creation only).
    CreatedEmpty,
    /// Conversation exists with at least one message.
    Active,
}

/// The protocol engine: consumes inbound events, consults the registry
/// and conversation store, and emits outbound events through the
/// channel.
///
/// One router instance owns all relay state. Callers must process each
/// event to completion before the next (see the engine dispatcher); the
/// router itself holds no locks.
#[derive(Debug, Default)]
pub struct Router {
    registry: IdentityRegistry,
    conversations: ConversationStore,
    validation: ValidationMode,
}

impl Router {
    pub fn new(validation: ValidationMode) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            conversations: ConversationStore::new(),
            validation,
        }
    }

    /// Process one inbound event from the connection `handle`.
    pub fn handle_event<C: Channel>(
        &mut self,
        channel: &C,
        handle: &ChannelHandle,
        event: ClientEvent,
    ) {
        if let Err(reason) = event.validate() {
            tracing::warn!("Rejected {} event: {}", event.name(), reason);
            if self.validation.is_strict() {
                channel.deliver(handle, ServerEvent::error(reason));
            }
            return;
        }

        match event {
            ClientEvent::Join { user_id } => self.on_join(channel, handle, user_id),
            ClientEvent::ChatList { user_id } => self.on_chat_list(channel, handle, &user_id),
            ClientEvent::CreateChat {
                user_id,
                receiver_id,
            } => self.on_create_chat(channel, &user_id, &receiver_id),
            ClientEvent::AddMessage {
                sender,
                receiver,
                body,
            } => self.on_add_message(channel, &sender, &receiver, body),
        }
    }

    /// Process a connection teardown. Bindings for the handle are
    /// dropped; conversations are untouched.
    pub fn handle_disconnect(&mut self, handle: &ChannelHandle) {
        let removed = self.registry.unregister(handle);
        tracing::debug!("Disconnect {}: {} binding(s) removed", handle, removed);
    }

    fn on_join<C: Channel>(&mut self, channel: &C, handle: &ChannelHandle, user_id: String) {
        tracing::debug!("{} joined on {}", user_id, handle);
        self.registry.register(user_id, handle.clone());
        channel.deliver(handle, ServerEvent::join_ok());
    }

    fn on_chat_list<C: Channel>(&self, channel: &C, handle: &ChannelHandle, user_id: &str) {
        let views = self.conversations.list_for(user_id);
        channel.deliver(handle, ServerEvent::ChatListResponse(views));
    }

    fn on_create_chat<C: Channel>(&mut self, channel: &C, user_id: &str, receiver_id: &str) {
        let conversation = self.conversations.create_empty(user_id, receiver_id);
        let view = ConversationView::for_identity(conversation, user_id);

        if let Some(target) = self.registry.lookup(user_id) {
            channel.deliver(target, ServerEvent::CreateChatResponse(view));
        }
    }

    fn on_add_message<C: Channel>(
        &mut self,
        channel: &C,
        sender: &str,
        receiver: &str,
        body: String,
    ) {
        let message = Message::new(body, sender);
        let outcome = self
            .conversations
            .find_or_append(sender, receiver, message.clone());

        let prior = if !outcome.existed_before {
            PairState::None
        } else if outcome.had_messages_before {
            PairState::Active
        } else {
            PairState::CreatedEmpty
        };

        if let Some(target) = self.registry.lookup(sender) {
            channel.deliver(target, ServerEvent::sent(&message, receiver));
        }

        match prior {
            PairState::Active => {
                if let Some(target) = self.registry.lookup(receiver) {
                    channel.deliver(target, ServerEvent::received(&message));
                }
            }
            PairState::CreatedEmpty => {
                // The counterpart explicitly opened this chat earlier;
                // hand them the now-populated conversation instead of a
                // bare received notification.
                if let Some(target) = self.registry.lookup(receiver) {
                    channel.deliver(
                        target,
                        ServerEvent::CreateChatResponse(ConversationView {
                            contact: sender.to_string(),
                            messages: vec![message],
                        }),
                    );
                }
            }
            // A brand-new implicit conversation stays invisible to the
            // receiver until they poll chat-list.
            PairState::None => {}
        }
    }

    /// Registered handle for `identity`, if any.
    pub fn lookup(&self, identity: &str) -> Option<&ChannelHandle> {
        self.registry.lookup(identity)
    }

    /// Number of stored conversations.
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}
