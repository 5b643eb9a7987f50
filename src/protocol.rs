#![cfg(feature = "std")]

//! Messages exchanged between the session server and connected players.
//! One closed enum per direction; frames are decoded into these at the
//! transport boundary, before any session logic sees them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::common::{Coord, PlacementError};

pub const PROTOCOL_VERSION: u16 = 1;

/// Stable player identity chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

/// Token naming a session; shared out of band for friend play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// A fresh random token.
    pub fn generate() -> Self {
        RoomId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public identity of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id.into()),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Pair with whoever else is waiting.
    Random,
    /// Create a room to share, or join one by token.
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinRejectReason {
    /// The room already has two occupants.
    Full,
    /// The joiner is the room's creator.
    SelfJoin,
    /// No room with that token.
    NotFound,
}

/// Player → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    Hello {
        version: u16,
    },
    Matchmake {
        mode: MatchMode,
        room: Option<RoomId>,
        player: PlayerIdentity,
    },
    /// Full fleet layout; ends placement for the sender.
    SubmitPlacement {
        room: RoomId,
        board: Board,
    },
    SubmitShot {
        room: RoomId,
        row: u8,
        col: u8,
    },
    /// Ask for a server status snapshot.
    Status,
}

/// Server → player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    Welcome {
        version: u16,
    },
    /// Friend room created; waiting for the peer to join.
    RoomCreated {
        room: RoomId,
    },
    /// Both slots are filled.
    Paired {
        room: RoomId,
        opponent: PlayerIdentity,
    },
    JoinRejected {
        reason: JoinRejectReason,
    },
    /// The submitted board is not a legal fleet; placement stays open.
    PlacementRejected {
        reason: PlacementError,
    },
    /// The sender's placement was accepted.
    ReadyConfirmed,
    /// The other slot finished placement.
    PeerReady,
    MatchStart {
        own_board: Board,
        opponent_view: Board,
        is_my_turn: bool,
    },
    /// Outcome of a shot, sent to both slots.
    ShotResult {
        row: u8,
        col: u8,
        hit: bool,
        sunk: bool,
        /// Cells of the sunk ship; empty unless `sunk`.
        sunk_cells: Vec<(u8, u8)>,
        shooter: PlayerId,
        game_over: bool,
        winner: Option<PlayerId>,
    },
    /// Sent after a miss.
    TurnChanged {
        is_my_turn: bool,
    },
    /// Forfeit notice: the other player disconnected.
    OpponentLeft,
    Status {
        rooms: usize,
        waiting: usize,
        uptime_secs: u64,
    },
}

/// Narrow board coordinates for the wire.
pub fn to_wire(cells: &[Coord]) -> Vec<(u8, u8)> {
    cells.iter().map(|&(r, c)| (r as u8, c as u8)).collect()
}

/// Widen wire coordinates.
pub fn from_wire(cells: &[(u8, u8)]) -> Vec<Coord> {
    cells.iter().map(|&(r, c)| (r as usize, c as usize)).collect()
}
