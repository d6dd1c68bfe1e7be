//! Identity registry for pairchat.
//!
//! Tracks which live connection currently speaks for a logical identity.
//! Bindings are appended on `join` and removed on disconnect, matched by
//! channel handle so other connections for the same identity survive.

use crate::protocol::ChannelHandle;

/// One identity↔connection binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityBinding {
    pub identity: String,
    pub handle: ChannelHandle,
}

/// Registry of active identity bindings.
///
/// Uniqueness is not enforced: an identity joining from a second
/// connection simply adds another entry, and lookups return the first
/// match in registration order.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    bindings: Vec<IdentityBinding>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Append a binding for `identity` on `handle`.
    pub fn register(&mut self, identity: impl Into<String>, handle: ChannelHandle) {
        self.bindings.push(IdentityBinding {
            identity: identity.into(),
            handle,
        });
    }

    /// First registered handle for `identity`, if any.
    pub fn lookup(&self, identity: &str) -> Option<&ChannelHandle> {
        self.bindings
            .iter()
            .find(|b| b.identity == identity)
            .map(|b| &b.handle)
    }

    /// Remove every binding whose handle matches the disconnecting
    /// connection. Returns the number removed; zero is not an error.
    pub fn unregister(&mut self, handle: &ChannelHandle) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| &b.handle != handle);
        before - self.bindings.len()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = IdentityRegistry::new();
        let handle = ChannelHandle::new("conn-1");

        assert!(registry.lookup("alice").is_none());

        registry.register("alice", handle.clone());
        assert_eq!(registry.lookup("alice"), Some(&handle));
        assert!(registry.lookup("bob").is_none());
    }

    #[test]
    fn test_first_binding_wins() {
        let mut registry = IdentityRegistry::new();
        let first = ChannelHandle::new("conn-1");
        let second = ChannelHandle::new("conn-2");

        registry.register("alice", first.clone());
        registry.register("alice", second);

        assert_eq!(registry.lookup("alice"), Some(&first));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_matches_by_handle() {
        let mut registry = IdentityRegistry::new();
        let phone = ChannelHandle::new("conn-phone");
        let laptop = ChannelHandle::new("conn-laptop");

        registry.register("alice", phone.clone());
        registry.register("alice", laptop.clone());
        registry.register("bob", phone.clone());

        // Disconnecting the phone drops both of its bindings, but
        // alice's laptop connection stays registered.
        assert_eq!(registry.unregister(&phone), 2);
        assert_eq!(registry.lookup("alice"), Some(&laptop));
        assert!(registry.lookup("bob").is_none());
    }

    #[test]
    fn test_unregister_unknown_handle_is_noop() {
        let mut registry = IdentityRegistry::new();
        registry.register("alice", ChannelHandle::new("conn-1"));

        assert_eq!(registry.unregister(&ChannelHandle::new("conn-9")), 0);
        assert_eq!(registry.len(), 1);
    }
}
