//! Conversation store for pairchat.
//!
//! Handles:
//! - Pairwise conversations keyed by an unordered identity pair
//! - Append-only message logs
//! - Per-identity projections for chat listings

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single chat message. `owner` is the authoring identity, independent
/// of who the message is being delivered to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub body: String,
    pub owner: String,
}

impl Message {
    pub fn new(body: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            owner: owner.into(),
        }
    }
}

/// Canonical key for an unordered identity pair.
///
/// The two identities are stored lexicographically sorted, so (a, b) and
/// (b, a) produce the same key and a duplicate conversation for a pair
/// cannot be created through either field order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// A conversation between exactly two identities.
///
/// Participants keep the order of first use; matching always goes
/// through the canonical key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub participant_a: String,
    pub participant_b: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    fn new(a: &str, b: &str) -> Self {
        Self {
            participant_a: a.to_string(),
            participant_b: b.to_string(),
            messages: Vec::new(),
        }
    }

    /// Whether `identity` is one of the two participants.
    pub fn involves(&self, identity: &str) -> bool {
        self.participant_a == identity || self.participant_b == identity
    }

    /// The other participant from `identity`'s point of view.
    pub fn counterpart(&self, identity: &str) -> &str {
        if self.participant_a == identity {
            &self.participant_b
        } else {
            &self.participant_a
        }
    }
}

/// Projection of a conversation from one participant's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationView {
    pub contact: String,
    pub messages: Vec<Message>,
}

impl ConversationView {
    /// Project `conversation` as seen by `identity`.
    pub fn for_identity(conversation: &Conversation, identity: &str) -> Self {
        Self {
            contact: conversation.counterpart(identity).to_string(),
            messages: conversation.messages.clone(),
        }
    }
}

/// What `find_or_append` found before it appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// A conversation for the pair already existed.
    pub existed_before: bool,
    /// That conversation already held at least one message.
    pub had_messages_before: bool,
}

/// In-memory store of all conversations, one per unordered identity
/// pair. Conversations live for the process lifetime; nothing here ever
/// removes one.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<PairKey, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: HashMap::new(),
        }
    }

    /// Find the conversation for the unordered pair (a, b).
    pub fn find(&self, a: &str, b: &str) -> Option<&Conversation> {
        self.conversations.get(&PairKey::new(a, b))
    }

    /// Append `message` to the pair's conversation, creating it first if
    /// absent. The outcome reports the state *before* the append.
    pub fn find_or_append(
        &mut self,
        sender: &str,
        receiver: &str,
        message: Message,
    ) -> AppendOutcome {
        let key = PairKey::new(sender, receiver);
        let existed_before = self.conversations.contains_key(&key);

        let conversation = self
            .conversations
            .entry(key)
            .or_insert_with(|| Conversation::new(sender, receiver));
        let had_messages_before = !conversation.messages.is_empty();

        conversation.messages.push(message);
        AppendOutcome {
            existed_before,
            had_messages_before,
        }
    }

    /// Create an empty conversation for the pair, or return the existing
    /// one unchanged. Appends nothing either way.
    pub fn create_empty(&mut self, a: &str, b: &str) -> &Conversation {
        self.conversations
            .entry(PairKey::new(a, b))
            .or_insert_with(|| Conversation::new(a, b))
    }

    /// Every conversation containing `identity`, projected with the
    /// other participant as `contact`. Sorted by contact so output is
    /// deterministic; message order within each view is append order.
    pub fn list_for(&self, identity: &str) -> Vec<ConversationView> {
        let mut views: Vec<ConversationView> = self
            .conversations
            .values()
            .filter(|c| c.involves(identity))
            .map(|c| ConversationView::for_identity(c, identity))
            .collect();

        views.sort_by(|a, b| a.contact.cmp(&b.contact));
        views
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new("alice", "bob"), PairKey::new("bob", "alice"));
        assert_ne!(PairKey::new("alice", "bob"), PairKey::new("alice", "carol"));
    }

    #[test]
    fn test_find_matches_either_order() {
        let mut store = ConversationStore::new();
        store.find_or_append("alice", "bob", Message::new("hi", "alice"));

        let forward = store.find("alice", "bob").unwrap();
        let reverse = store.find("bob", "alice").unwrap();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_find_or_append_creates_then_appends() {
        let mut store = ConversationStore::new();

        let outcome = store.find_or_append("alice", "bob", Message::new("hi", "alice"));
        assert!(!outcome.existed_before);
        assert!(!outcome.had_messages_before);

        let outcome = store.find_or_append("bob", "alice", Message::new("yo", "bob"));
        assert!(outcome.existed_before);
        assert!(outcome.had_messages_before);

        assert_eq!(store.len(), 1);
        let conversation = store.find("alice", "bob").unwrap();
        assert_eq!(conversation.messages.len(), 2);
    }

    #[test]
    fn test_append_after_explicit_create() {
        let mut store = ConversationStore::new();
        store.create_empty("alice", "bob");

        let outcome = store.find_or_append("alice", "bob", Message::new("hi", "alice"));
        assert!(outcome.existed_before);
        assert!(!outcome.had_messages_before);
    }

    #[test]
    fn test_create_is_noop_in_either_order() {
        // A create arriving with the fields swapped must match the
        // existing conversation, never produce a second one.
        let mut store = ConversationStore::new();
        store.find_or_append("alice", "bob", Message::new("hi", "alice"));

        store.create_empty("alice", "bob");
        store.create_empty("bob", "alice");

        assert_eq!(store.len(), 1);
        let conversation = store.find("alice", "bob").unwrap();
        assert_eq!(conversation.messages.len(), 1);
    }

    #[test]
    fn test_messages_stay_in_append_order() {
        let mut store = ConversationStore::new();
        store.find_or_append("alice", "bob", Message::new("one", "alice"));
        store.find_or_append("bob", "alice", Message::new("two", "bob"));
        store.find_or_append("alice", "bob", Message::new("three", "alice"));

        let bodies: Vec<&str> = store
            .find("alice", "bob")
            .unwrap()
            .messages
            .iter()
            .map(|m| m.body.as_str())
            .collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_list_for_projects_counterpart() {
        let mut store = ConversationStore::new();
        store.find_or_append("alice", "bob", Message::new("hi bob", "alice"));
        store.find_or_append("carol", "alice", Message::new("hi alice", "carol"));
        store.find_or_append("bob", "carol", Message::new("hi carol", "bob"));

        let views = store.list_for("alice");
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].contact, "bob");
        assert_eq!(views[1].contact, "carol");
        assert_eq!(views[1].messages[0].owner, "carol");

        assert!(store.list_for("dave").is_empty());
    }
}
