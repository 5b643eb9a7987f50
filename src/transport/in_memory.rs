#![cfg(feature = "std")]

use tokio::sync::mpsc::UnboundedReceiver;

use crate::hub::{Connection, HubHandle};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::Transport;

/// A player attached straight to a running hub, with no sockets in between.
/// Dropping the transport disconnects the player.
pub struct InMemoryTransport {
    conn: Connection,
    inbox: UnboundedReceiver<ServerMessage>,
}

impl InMemoryTransport {
    pub fn connect(hub: &HubHandle) -> anyhow::Result<Self> {
        let (conn, inbox) = hub.connect()?;
        Ok(Self { conn, inbox })
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    type Outbound = ClientMessage;
    type Inbound = ServerMessage;

    async fn send(&mut self, msg: ClientMessage) -> anyhow::Result<()> {
        self.conn.send(msg)
    }

    async fn recv(&mut self) -> anyhow::Result<ServerMessage> {
        self.inbox
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}
