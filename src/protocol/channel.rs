//! Channel abstraction over live client connections.

use std::fmt;

use super::events::ServerEvent;

/// Opaque, transport-assigned identifier for one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    /// Generate a fresh handle (ULID).
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability to address one live connection.
///
/// Delivery is best-effort: events addressed to unknown or dead
/// connections are dropped without error.
pub trait Channel {
    fn deliver(&self, handle: &ChannelHandle, event: ServerEvent);
}

/// Test double that records every delivery in order.
#[cfg(test)]
pub(crate) struct RecordingChannel {
    deliveries: std::cell::RefCell<Vec<(ChannelHandle, ServerEvent)>>,
}

#[cfg(test)]
impl RecordingChannel {
    pub(crate) fn new() -> Self {
        Self {
            deliveries: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// All deliveries so far, in emission order.
    pub(crate) fn all(&self) -> Vec<(ChannelHandle, ServerEvent)> {
        self.deliveries.borrow().clone()
    }

    /// Events delivered to one connection, in emission order.
    pub(crate) fn events_for(&self, handle: &ChannelHandle) -> Vec<ServerEvent> {
        self.deliveries
            .borrow()
            .iter()
            .filter(|(h, _)| h == handle)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.deliveries.borrow_mut().clear();
    }
}

#[cfg(test)]
impl Channel for RecordingChannel {
    fn deliver(&self, handle: &ChannelHandle, event: ServerEvent) {
        self.deliveries
            .borrow_mut()
            .push((handle.clone(), event));
    }
}
