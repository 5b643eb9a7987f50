//! Message transports. A transport carries one closed message type out and
//! another in; the client side sends [`ClientMessage`]s and receives
//! [`ServerMessage`]s.
//!
//! [`ClientMessage`]: crate::protocol::ClientMessage
//! [`ServerMessage`]: crate::protocol::ServerMessage

use crate::protocol::{ClientMessage, ServerMessage};

#[async_trait::async_trait]
pub trait Transport: Send {
    type Outbound: Send + 'static;
    type Inbound: Send + 'static;

    async fn send(&mut self, msg: Self::Outbound) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Self::Inbound>;
}

/// Boxed transport as seen from a player.
pub type ClientTransport = Box<dyn Transport<Outbound = ClientMessage, Inbound = ServerMessage>>;

pub mod in_memory;
pub mod tcp;
