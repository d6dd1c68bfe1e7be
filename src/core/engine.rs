//! Engine dispatcher for pairchat.
//!
//! All relay state is owned by a single task that drains a command
//! queue: connection attach/detach and inbound events. Each command is
//! processed to completion before the next one starts, which gives the
//! router its run-to-completion guarantee without any locking.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::config::ValidationMode;
use crate::core::router::Router;
use crate::protocol::{Channel, ChannelHandle, ClientEvent, ServerEvent};

/// Commands accepted by the engine task.
#[derive(Debug)]
pub enum EngineCommand {
    /// A connection came up; `sender` is its outbound event queue.
    Attach {
        handle: ChannelHandle,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    /// A decoded event arrived on a connection.
    Inbound {
        handle: ChannelHandle,
        event: ClientEvent,
    },
    /// A connection went away.
    Detach { handle: ChannelHandle },
}

/// Cloneable handle used by transport tasks to feed the engine.
///
/// Sends after the engine has shut down are silently dropped; a closing
/// transport has nothing useful to do with that error.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    pub fn attach(&self, handle: ChannelHandle, sender: mpsc::UnboundedSender<ServerEvent>) {
        let _ = self.tx.send(EngineCommand::Attach { handle, sender });
    }

    pub fn inbound(&self, handle: ChannelHandle, event: ClientEvent) {
        let _ = self.tx.send(EngineCommand::Inbound { handle, event });
    }

    pub fn detach(&self, handle: ChannelHandle) {
        let _ = self.tx.send(EngineCommand::Detach { handle });
    }
}

/// Live connections, addressable by channel handle.
///
/// This is the [`Channel`] implementation the router emits through when
/// hosted by the WebSocket transport.
#[derive(Debug, Default)]
struct ConnectionTable {
    senders: HashMap<ChannelHandle, mpsc::UnboundedSender<ServerEvent>>,
}

impl ConnectionTable {
    fn attach(&mut self, handle: ChannelHandle, sender: mpsc::UnboundedSender<ServerEvent>) {
        self.senders.insert(handle, sender);
    }

    fn detach(&mut self, handle: &ChannelHandle) {
        self.senders.remove(handle);
    }
}

impl Channel for ConnectionTable {
    fn deliver(&self, handle: &ChannelHandle, event: ServerEvent) {
        if let Some(sender) = self.senders.get(handle) {
            // The receiving pump may already be gone; best-effort.
            let _ = sender.send(event);
        }
    }
}

/// Spawn the engine task and return its handle.
pub fn spawn(validation: ValidationMode) -> EngineHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run(rx, validation));
    EngineHandle { tx }
}

async fn run(mut rx: mpsc::UnboundedReceiver<EngineCommand>, validation: ValidationMode) {
    let mut router = Router::new(validation);
    let mut connections = ConnectionTable::default();

    while let Some(command) = rx.recv().await {
        match command {
            EngineCommand::Attach { handle, sender } => {
                tracing::debug!("Connection {} attached", handle);
                connections.attach(handle, sender);
            }
            EngineCommand::Inbound { handle, event } => {
                router.handle_event(&connections, &handle, event);
            }
            EngineCommand::Detach { handle } => {
                tracing::debug!("Connection {} detached", handle);
                connections.detach(&handle);
                router.handle_disconnect(&handle);
            }
        }
    }

    tracing::debug!("Engine queue closed, dispatcher exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DeliveryStatus;

    struct TestClient {
        handle: ChannelHandle,
        rx: mpsc::UnboundedReceiver<ServerEvent>,
    }

    fn connect(engine: &EngineHandle) -> TestClient {
        let handle = ChannelHandle::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        engine.attach(handle.clone(), tx);
        TestClient { handle, rx }
    }

    impl TestClient {
        fn join_as(&self, engine: &EngineHandle, user: &str) {
            engine.inbound(
                self.handle.clone(),
                ClientEvent::Join {
                    user_id: user.to_string(),
                },
            );
        }

        /// Drain everything delivered so far.
        async fn next(&mut self) -> ServerEvent {
            self.rx.recv().await.expect("engine dropped the connection")
        }
    }

    #[tokio::test]
    async fn test_engine_round_trip() {
        let engine = spawn(ValidationMode::default());
        let mut alice = connect(&engine);
        let mut bob = connect(&engine);

        alice.join_as(&engine, "alice");
        bob.join_as(&engine, "bob");
        assert_eq!(alice.next().await, ServerEvent::join_ok());
        assert_eq!(bob.next().await, ServerEvent::join_ok());

        engine.inbound(
            alice.handle.clone(),
            ClientEvent::AddMessage {
                sender: "alice".to_string(),
                receiver: "bob".to_string(),
                body: "hi".to_string(),
            },
        );
        match alice.next().await {
            ServerEvent::AddMessageResponse { status, data } => {
                assert_eq!(status, DeliveryStatus::Sent);
                assert_eq!(data.contact, "bob");
                assert_eq!(data.owner, "alice");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // The pair was implicit, so bob hears nothing until he sends on
        // the now-active conversation.
        engine.inbound(
            bob.handle.clone(),
            ClientEvent::AddMessage {
                sender: "bob".to_string(),
                receiver: "alice".to_string(),
                body: "yo".to_string(),
            },
        );
        match bob.next().await {
            ServerEvent::AddMessageResponse { status, .. } => {
                assert_eq!(status, DeliveryStatus::Sent);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match alice.next().await {
            ServerEvent::AddMessageResponse { status, data } => {
                assert_eq!(status, DeliveryStatus::Received);
                assert_eq!(data.owner, "bob");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detach_unregisters_identity() {
        let engine = spawn(ValidationMode::default());
        let mut alice = connect(&engine);
        let mut bob = connect(&engine);

        alice.join_as(&engine, "alice");
        bob.join_as(&engine, "bob");
        alice.next().await;
        bob.next().await;

        engine.inbound(
            alice.handle.clone(),
            ClientEvent::AddMessage {
                sender: "alice".to_string(),
                receiver: "bob".to_string(),
                body: "hi".to_string(),
            },
        );
        alice.next().await;

        engine.detach(bob.handle.clone());

        // Conversation is ACTIVE but bob is gone: only the sender
        // confirmation goes out.
        engine.inbound(
            alice.handle.clone(),
            ClientEvent::AddMessage {
                sender: "alice".to_string(),
                receiver: "bob".to_string(),
                body: "still there?".to_string(),
            },
        );
        match alice.next().await {
            ServerEvent::AddMessageResponse { status, .. } => {
                assert_eq!(status, DeliveryStatus::Sent);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(bob.rx.try_recv().is_err());
    }
}
