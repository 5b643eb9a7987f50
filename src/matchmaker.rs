#![cfg(feature = "std")]

//! Assigns players to sessions: a waiting pool for random opponents and
//! token-addressed rooms for friends.

use std::collections::{HashMap, VecDeque};

use log::{debug, info};

use crate::protocol::{JoinRejectReason, MatchMode, PlayerIdentity, RoomId, ServerMessage};
use crate::session::{ConnId, Dispatch, MatchSession, PlayerSlot};
use crate::settings::PlacementPolicy;

/// Room index: token to session.
pub type Rooms = HashMap<RoomId, MatchSession>;

/// What a matchmaking request produced.
#[derive(Debug, Default)]
pub struct Seating {
    pub dispatches: Vec<Dispatch>,
    /// Connections that now sit in a session.
    pub seated: Vec<(ConnId, RoomId)>,
}

impl Seating {
    fn reply(conn: ConnId, msg: ServerMessage) -> Self {
        Self {
            dispatches: vec![Dispatch::new(conn, msg)],
            seated: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Matchmaker {
    pool: VecDeque<PlayerSlot>,
    policy: PlacementPolicy,
}

impl Matchmaker {
    pub fn new(policy: PlacementPolicy) -> Self {
        Self {
            pool: VecDeque::new(),
            policy,
        }
    }

    /// Number of players waiting for a random opponent.
    pub fn waiting(&self) -> usize {
        self.pool.len()
    }

    pub fn is_waiting(&self, conn: ConnId) -> bool {
        self.pool.iter().any(|s| s.conn() == conn)
    }

    /// Remove `conn` from the pool. Returns whether it was waiting.
    pub fn withdraw(&mut self, conn: ConnId) -> bool {
        let before = self.pool.len();
        self.pool.retain(|s| s.conn() != conn);
        before != self.pool.len()
    }

    pub fn request(
        &mut self,
        rooms: &mut Rooms,
        conn: ConnId,
        mode: MatchMode,
        room: Option<RoomId>,
        player: PlayerIdentity,
    ) -> Seating {
        match (mode, room) {
            (MatchMode::Random, _) => self.pair_random(rooms, conn, player),
            (MatchMode::Friend, None) => self.create_room(rooms, conn, player),
            (MatchMode::Friend, Some(room)) => Self::join_room(rooms, conn, room, player),
        }
    }

    fn pair_random(&mut self, rooms: &mut Rooms, conn: ConnId, player: PlayerIdentity) -> Seating {
        let Some(pos) = self.pool.iter().position(|s| s.id() != &player.id) else {
            debug!("{} waits for a random opponent", player.id);
            self.pool.push_back(PlayerSlot::new(player, conn));
            return Seating::default();
        };
        let Some(first) = self.pool.remove(pos) else {
            return Seating::default();
        };
        let room = RoomId::generate();
        info!("room {}: paired {} with {}", room, first.id(), player.id);
        let first_conn = first.conn();
        let session = MatchSession::paired(room.clone(), first, PlayerSlot::new(player, conn), self.policy);
        let dispatches = session.paired_notices();
        rooms.insert(room.clone(), session);
        Seating {
            dispatches,
            seated: vec![(first_conn, room.clone()), (conn, room)],
        }
    }

    fn create_room(&self, rooms: &mut Rooms, conn: ConnId, player: PlayerIdentity) -> Seating {
        let room = RoomId::generate();
        info!("room {}: created by {}", room, player.id);
        rooms.insert(
            room.clone(),
            MatchSession::awaiting(room.clone(), PlayerSlot::new(player, conn), self.policy),
        );
        Seating {
            dispatches: vec![Dispatch::new(conn, ServerMessage::RoomCreated { room: room.clone() })],
            seated: vec![(conn, room)],
        }
    }

    fn join_room(rooms: &mut Rooms, conn: ConnId, room: RoomId, player: PlayerIdentity) -> Seating {
        let Some(session) = rooms.get_mut(&room) else {
            info!("{} asked for unknown room {}", player.id, room);
            return Seating::reply(conn, ServerMessage::JoinRejected {
                reason: JoinRejectReason::NotFound,
            });
        };
        let joiner = player.id.clone();
        match session.join(player, conn) {
            Ok(dispatches) => Seating {
                dispatches,
                seated: vec![(conn, room)],
            },
            Err(reason) => {
                info!("room {}: join by {} rejected: {:?}", room, joiner, reason);
                Seating::reply(conn, ServerMessage::JoinRejected { reason })
            }
        }
    }
}
