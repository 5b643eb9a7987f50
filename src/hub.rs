#![cfg(feature = "std")]

//! The session server's event loop. Every connection feeds one queue and a
//! single task applies the events in arrival order, so the session state
//! needs no locking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{timeout, Duration};

use crate::manager::SessionManager;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{ConnId, Dispatch};
use crate::settings::ServerConfig;
use crate::stats::StatsStore;
use crate::transport::tcp::{read_frame, write_frame};

#[derive(Debug)]
pub enum HubEvent {
    Connected {
        conn: ConnId,
        outbox: UnboundedSender<ServerMessage>,
    },
    Message {
        conn: ConnId,
        msg: ClientMessage,
    },
    Disconnected {
        conn: ConnId,
    },
}

pub struct Hub {
    manager: SessionManager,
    events: UnboundedReceiver<HubEvent>,
    outboxes: HashMap<ConnId, UnboundedSender<ServerMessage>>,
}

/// Cloneable entry point for registering connections.
#[derive(Clone)]
pub struct HubHandle {
    events: UnboundedSender<HubEvent>,
    next_conn: Arc<AtomicU64>,
}

/// A registered connection. Dropping it disconnects.
pub struct Connection {
    conn: ConnId,
    events: UnboundedSender<HubEvent>,
}

impl Hub {
    pub fn new(config: &ServerConfig, stats: Box<dyn StatsStore>) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            manager: SessionManager::new(config.placement_policy, stats),
            events: rx,
            outboxes: HashMap::new(),
        };
        let handle = HubHandle {
            events: tx,
            next_conn: Arc::new(AtomicU64::new(1)),
        };
        (hub, handle)
    }

    /// Process events until every handle and connection is dropped, then
    /// hand back the final state.
    pub async fn run(mut self) -> SessionManager {
        while let Some(event) = self.events.recv().await {
            self.apply(event);
        }
        info!("hub stopped");
        self.manager
    }

    fn apply(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { conn, outbox } => {
                debug!("{:?} connected", conn);
                self.outboxes.insert(conn, outbox);
            }
            HubEvent::Message { conn, msg } => {
                let out = self.manager.handle(conn, msg);
                self.deliver(out);
            }
            HubEvent::Disconnected { conn } => {
                debug!("{:?} disconnected", conn);
                let out = self.manager.disconnect(conn);
                self.outboxes.remove(&conn);
                self.deliver(out);
            }
        }
    }

    fn deliver(&self, dispatches: Vec<Dispatch>) {
        for Dispatch { conn, msg } in dispatches {
            match self.outboxes.get(&conn) {
                Some(outbox) => {
                    if outbox.send(msg).is_err() {
                        debug!("{:?} outbox closed", conn);
                    }
                }
                None => debug!("{:?} has no outbox", conn),
            }
        }
    }
}

impl HubHandle {
    /// Register a new connection. Returns its handle and the stream of
    /// messages the server sends to it.
    pub fn connect(&self) -> anyhow::Result<(Connection, UnboundedReceiver<ServerMessage>)> {
        let conn = ConnId(self.next_conn.fetch_add(1, Ordering::Relaxed));
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.events
            .send(HubEvent::Connected { conn, outbox })
            .map_err(|_| anyhow::anyhow!("Hub is not running"))?;
        Ok((
            Connection {
                conn,
                events: self.events.clone(),
            },
            inbox,
        ))
    }
}

impl Connection {
    pub fn id(&self) -> ConnId {
        self.conn
    }

    pub fn send(&self, msg: ClientMessage) -> anyhow::Result<()> {
        self.events
            .send(HubEvent::Message { conn: self.conn, msg })
            .map_err(|_| anyhow::anyhow!("Hub is not running"))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.events.send(HubEvent::Disconnected { conn: self.conn });
    }
}

/// Accept TCP players until the listener fails. A connection is dropped,
/// and its seat forfeited, once either its reads or its writes fail.
pub async fn serve_tcp(listener: TcpListener, handle: HubHandle, config: &ServerConfig) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("accepted {}", peer);
        let handle = handle.clone();
        let max = config.max_message_size;
        let write_timeout = config.write_timeout;
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, handle, max, write_timeout).await {
                warn!("connection {}: {}", peer, e);
            }
            debug!("connection {} closed", peer);
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    handle: HubHandle,
    max_message_size: u32,
    write_timeout: Duration,
) -> anyhow::Result<()> {
    let (conn, mut outbox) = handle.connect()?;
    let (mut reader, mut writer) = stream.into_split();
    let id = conn.id();

    // the writer only ends on its own when a write fails or times out
    let mut writer_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            match timeout(write_timeout, write_frame(&mut writer, &msg, max_message_size)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("{:?} write failed: {}", id, e);
                    break;
                }
                Err(_) => {
                    warn!("{:?} write timed out after {:?}", id, write_timeout);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            frame = read_frame::<_, ClientMessage>(&mut reader, max_message_size) => match frame {
                Ok(msg) => conn.send(msg)?,
                Err(e) => {
                    debug!("{:?} read ended: {}", id, e);
                    return Ok(());
                }
            },
            _ = &mut writer_task => {
                debug!("{:?} writer stopped, dropping connection", id);
                return Ok(());
            }
        }
    }
}
