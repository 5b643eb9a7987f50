#![cfg(feature = "std")]

//! Routes decoded client messages to the matchmaker and the sessions, and
//! tears sessions down when they end.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info, warn};

use crate::matchmaker::{Matchmaker, Rooms};
use crate::protocol::{ClientMessage, RoomId, ServerMessage, PROTOCOL_VERSION};
use crate::session::{ConnId, Dispatch, MatchSession, Phase};
use crate::settings::PlacementPolicy;
use crate::stats::{MatchResult, StatsStore};

/// Counters reported by a status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub rooms: usize,
    pub waiting: usize,
    pub uptime_secs: u64,
}

pub struct SessionManager {
    matchmaker: Matchmaker,
    rooms: Rooms,
    seats: HashMap<ConnId, RoomId>,
    stats: Box<dyn StatsStore>,
    started: Instant,
}

impl SessionManager {
    pub fn new(policy: PlacementPolicy, stats: Box<dyn StatsStore>) -> Self {
        Self {
            matchmaker: Matchmaker::new(policy),
            rooms: Rooms::new(),
            seats: HashMap::new(),
            stats,
            started: Instant::now(),
        }
    }

    pub fn stats(&self) -> &dyn StatsStore {
        self.stats.as_ref()
    }

    pub fn room(&self, room: &RoomId) -> Option<&MatchSession> {
        self.rooms.get(room)
    }

    pub fn room_of(&self, conn: ConnId) -> Option<&RoomId> {
        self.seats.get(&conn)
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            rooms: self.rooms.len(),
            waiting: self.matchmaker.waiting(),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }

    /// Apply one message from `conn`.
    pub fn handle(&mut self, conn: ConnId, msg: ClientMessage) -> Vec<Dispatch> {
        match msg {
            ClientMessage::Hello { version } => {
                if version != PROTOCOL_VERSION {
                    warn!("{:?} speaks protocol {} (server {})", conn, version, PROTOCOL_VERSION);
                }
                vec![Dispatch::new(conn, ServerMessage::Welcome { version: PROTOCOL_VERSION })]
            }
            ClientMessage::Matchmake { mode, room, player } => {
                if self.seats.contains_key(&conn) || self.matchmaker.is_waiting(conn) {
                    debug!("{:?} already matched, request ignored", conn);
                    return Vec::new();
                }
                self.stats.register(&player);
                let seating = self.matchmaker.request(&mut self.rooms, conn, mode, room, player);
                self.seats.extend(seating.seated);
                seating.dispatches
            }
            ClientMessage::SubmitPlacement { room, board } => match self.session_for(conn, &room) {
                Some(session) => session.submit_placement(conn, board),
                None => Vec::new(),
            },
            ClientMessage::SubmitShot { room, row, col } => {
                let Some(session) = self.session_for(conn, &room) else {
                    return Vec::new();
                };
                let out = session.submit_shot(conn, row as usize, col as usize);
                if session.is_finished() {
                    self.record_finish(&room);
                    self.teardown(&room);
                }
                out
            }
            ClientMessage::Status => {
                let s = self.status();
                vec![Dispatch::new(
                    conn,
                    ServerMessage::Status {
                        rooms: s.rooms,
                        waiting: s.waiting,
                        uptime_secs: s.uptime_secs,
                    },
                )]
            }
        }
    }

    /// The connection is gone. Leaving the pool is silent; leaving a
    /// session forfeits it. Repeated calls are no-ops.
    pub fn disconnect(&mut self, conn: ConnId) -> Vec<Dispatch> {
        if self.matchmaker.withdraw(conn) {
            debug!("{:?} left the pool", conn);
        }
        let Some(room) = self.seats.get(&conn).cloned() else {
            return Vec::new();
        };
        let Some(session) = self.rooms.get_mut(&room) else {
            self.seats.remove(&conn);
            return Vec::new();
        };
        let contested = matches!(session.phase(), Phase::Placement | Phase::InProgress);
        let out = session.forfeit(conn);
        if contested {
            self.record_finish(&room);
        }
        self.teardown(&room);
        out
    }

    /// Session `room` if `conn` sits in it.
    fn session_for(&mut self, conn: ConnId, room: &RoomId) -> Option<&mut MatchSession> {
        if self.seats.get(&conn) != Some(room) {
            debug!("{:?} addressed room {} it is not in", conn, room);
            return None;
        }
        self.rooms.get_mut(room)
    }

    fn record_finish(&mut self, room: &RoomId) {
        let Some(session) = self.rooms.get(room) else {
            return;
        };
        let Some(winner) = session.winner() else {
            return;
        };
        for slot in session.slots() {
            let result = if slot.id() == winner {
                MatchResult::Win
            } else {
                MatchResult::Loss
            };
            self.stats.record_outcome(slot.id(), result, slot.shots(), slot.hits());
        }
    }

    fn teardown(&mut self, room: &RoomId) {
        if let Some(session) = self.rooms.remove(room) {
            for conn in session.connections() {
                self.seats.remove(&conn);
            }
            info!("room {}: closed", room);
        }
    }
}
