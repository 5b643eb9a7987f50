#![cfg(feature = "std")]

//! Authoritative state of one match between two connected players.
//!
//! ```text
//!   AwaitingOpponent ──(join)──→ Placement ──(both ready)──→ InProgress ──(all sunk)──→ Finished
//!          └──────────────(disconnect, any phase)───────────────────────────────────────────┘
//! ```
//!
//! A session owns its state outright and only changes through the methods
//! below, one event at a time. Each method returns the messages to deliver;
//! rejected intents return nothing and change nothing.

use log::{debug, info};

use crate::board::Board;
use crate::common::PlacementError;
use crate::fleet::Fleet;
use crate::protocol::{to_wire, JoinRejectReason, PlayerId, PlayerIdentity, RoomId, ServerMessage};
use crate::settings::PlacementPolicy;
use crate::shot::resolve_shot;

/// Handle of one connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

/// A message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub conn: ConnId,
    pub msg: ServerMessage,
}

impl Dispatch {
    pub fn new(conn: ConnId, msg: ServerMessage) -> Self {
        Self { conn, msg }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Friend room created, second slot empty.
    AwaitingOpponent,
    /// Both slots filled; fleets being submitted.
    Placement,
    InProgress,
    /// Terminal. `winner` is `None` only when the creator of a room left
    /// before anyone joined.
    Finished { winner: Option<PlayerId> },
}

/// One seat in a session.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    identity: PlayerIdentity,
    conn: ConnId,
    board: Option<Board>,
    fleet: Option<Fleet>,
    shots: u32,
    hits: u32,
}

impl PlayerSlot {
    pub fn new(identity: PlayerIdentity, conn: ConnId) -> Self {
        Self {
            identity,
            conn,
            board: None,
            fleet: None,
            shots: 0,
            hits: 0,
        }
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn id(&self) -> &PlayerId {
        &self.identity.id
    }

    pub fn conn(&self) -> ConnId {
        self.conn
    }

    pub fn is_ready(&self) -> bool {
        self.board.is_some()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn fleet(&self) -> Option<&Fleet> {
        self.fleet.as_ref()
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}

#[derive(Debug, Clone)]
pub struct MatchSession {
    room: RoomId,
    /// Slot 0 is the first player and owns the opening turn.
    slots: [Option<PlayerSlot>; 2],
    turn: PlayerId,
    phase: Phase,
    policy: PlacementPolicy,
}

impl MatchSession {
    /// A friend room with only its creator seated.
    pub fn awaiting(room: RoomId, creator: PlayerSlot, policy: PlacementPolicy) -> Self {
        Self {
            room,
            turn: creator.id().clone(),
            slots: [Some(creator), None],
            phase: Phase::AwaitingOpponent,
            policy,
        }
    }

    /// Both seats filled at once; `first` opens.
    pub fn paired(room: RoomId, first: PlayerSlot, second: PlayerSlot, policy: PlacementPolicy) -> Self {
        Self {
            room,
            turn: first.id().clone(),
            slots: [Some(first), Some(second)],
            phase: Phase::Placement,
            policy,
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// Id of the player allowed to shoot next.
    pub fn turn_owner(&self) -> &PlayerId {
        &self.turn
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match &self.phase {
            Phase::Finished { winner } => winner.as_ref(),
            _ => None,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = &PlayerSlot> {
        self.slots.iter().flatten()
    }

    pub fn slot_of(&self, conn: ConnId) -> Option<&PlayerSlot> {
        self.slots().find(|s| s.conn == conn)
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnId> + '_ {
        self.slots().map(|s| s.conn)
    }

    fn index_of(&self, conn: ConnId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.conn == conn))
    }

    /// Seat a second player in a friend room.
    pub fn join(&mut self, joiner: PlayerIdentity, conn: ConnId) -> Result<Vec<Dispatch>, JoinRejectReason> {
        let Some(creator) = self.slots[0].as_ref() else {
            return Err(JoinRejectReason::NotFound);
        };
        if self.slots[1].is_some() || self.phase != Phase::AwaitingOpponent {
            return Err(JoinRejectReason::Full);
        }
        if creator.id() == &joiner.id {
            return Err(JoinRejectReason::SelfJoin);
        }
        info!("room {}: {} joined {}", self.room, joiner.id, creator.id());
        self.slots[1] = Some(PlayerSlot::new(joiner, conn));
        self.phase = Phase::Placement;
        Ok(self.paired_notices())
    }

    /// Tell each seat who its opponent is.
    pub fn paired_notices(&self) -> Vec<Dispatch> {
        let [Some(a), Some(b)] = &self.slots else {
            return Vec::new();
        };
        vec![
            Dispatch::new(
                a.conn,
                ServerMessage::Paired {
                    room: self.room.clone(),
                    opponent: b.identity.clone(),
                },
            ),
            Dispatch::new(
                b.conn,
                ServerMessage::Paired {
                    room: self.room.clone(),
                    opponent: a.identity.clone(),
                },
            ),
        ]
    }

    /// Accept a seat's fleet layout. Once both seats are ready the match
    /// starts.
    pub fn submit_placement(&mut self, conn: ConnId, board: Board) -> Vec<Dispatch> {
        if self.phase != Phase::Placement {
            debug!("room {}: placement outside placement phase ignored", self.room);
            return Vec::new();
        }
        let Some(idx) = self.index_of(conn) else {
            return Vec::new();
        };
        let policy = self.policy;
        let Some(slot) = self.slots[idx].as_mut() else {
            return Vec::new();
        };
        if slot.is_ready() {
            debug!("room {}: {} already placed", self.room, slot.id());
            return Vec::new();
        }
        let fleet = match accept_layout(policy, &board) {
            Ok(fleet) => fleet,
            Err(reason) => {
                info!("room {}: placement from {} rejected: {}", self.room, slot.id(), reason);
                return vec![Dispatch::new(conn, ServerMessage::PlacementRejected { reason })];
            }
        };
        slot.board = Some(board);
        slot.fleet = Some(fleet);
        debug!("room {}: {} is ready", self.room, slot.id());

        let mut out = vec![Dispatch::new(conn, ServerMessage::ReadyConfirmed)];
        if let Some(other) = self.slots[1 - idx].as_ref() {
            out.push(Dispatch::new(other.conn, ServerMessage::PeerReady));
        }
        if self.slots().filter(|s| s.is_ready()).count() == 2 {
            self.phase = Phase::InProgress;
            info!("room {}: match started, {} opens", self.room, self.turn);
            out.extend(self.start_notices());
        }
        out
    }

    fn start_notices(&self) -> Vec<Dispatch> {
        let [Some(a), Some(b)] = &self.slots else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(2);
        for (me, them) in [(a, b), (b, a)] {
            if let (Some(own), Some(theirs)) = (me.board, them.board) {
                out.push(Dispatch::new(
                    me.conn,
                    ServerMessage::MatchStart {
                        own_board: own,
                        opponent_view: theirs.opponent_view(),
                        is_my_turn: me.id() == &self.turn,
                    },
                ));
            }
        }
        out
    }

    /// Apply a shot from `conn`. Rejected (no change, no messages) unless the
    /// match is in progress, the sender owns the turn and the target cell is
    /// on the board and not yet shot.
    pub fn submit_shot(&mut self, conn: ConnId, row: usize, col: usize) -> Vec<Dispatch> {
        if self.phase != Phase::InProgress {
            debug!("room {}: shot outside play ignored", self.room);
            return Vec::new();
        }
        let Some(idx) = self.index_of(conn) else {
            return Vec::new();
        };
        let [a, b] = &mut self.slots;
        let (Some(shooter), Some(target)) = (if idx == 0 { (a, b) } else { (b, a) }) else {
            return Vec::new();
        };
        if shooter.identity.id != self.turn {
            debug!("room {}: out-of-turn shot from {} ignored", self.room, shooter.id());
            return Vec::new();
        }
        let (Some(board), Some(fleet)) = (target.board.as_mut(), target.fleet.as_mut()) else {
            return Vec::new();
        };
        let outcome = match resolve_shot(board, fleet, row, col) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("room {}: shot from {} ignored: {}", self.room, shooter.id(), e);
                return Vec::new();
            }
        };

        shooter.shots += 1;
        if outcome.hit {
            shooter.hits += 1;
        }
        let shooter_id = shooter.identity.id.clone();
        let target_id = target.identity.id.clone();
        let conns = [shooter.conn, target.conn];
        debug!(
            "room {}: {} fired at ({}, {}): hit={} sunk={}",
            self.room, shooter_id, row, col, outcome.hit, outcome.sunk
        );

        let winner = outcome.game_over.then(|| shooter_id.clone());
        let result = ServerMessage::ShotResult {
            row: row as u8,
            col: col as u8,
            hit: outcome.hit,
            sunk: outcome.sunk,
            sunk_cells: to_wire(&outcome.sunk_cells),
            shooter: shooter_id.clone(),
            game_over: outcome.game_over,
            winner: winner.clone(),
        };
        let mut out: Vec<Dispatch> = conns.iter().map(|&c| Dispatch::new(c, result.clone())).collect();

        if outcome.game_over {
            info!("room {}: {} won", self.room, shooter_id);
            self.phase = Phase::Finished { winner };
        } else if !outcome.hit {
            self.turn = target_id;
            out.push(Dispatch::new(conns[0], ServerMessage::TurnChanged { is_my_turn: false }));
            out.push(Dispatch::new(conns[1], ServerMessage::TurnChanged { is_my_turn: true }));
        }
        out
    }

    /// The player on `conn` left. Any unfinished session ends with the other
    /// seat (if any) as winner, and that seat is told its opponent left.
    pub fn forfeit(&mut self, conn: ConnId) -> Vec<Dispatch> {
        if self.is_finished() {
            return Vec::new();
        }
        let Some(idx) = self.index_of(conn) else {
            return Vec::new();
        };
        let survivor = self.slots[1 - idx].as_ref();
        let winner = survivor.map(|s| s.identity.id.clone());
        let out = survivor
            .map(|s| vec![Dispatch::new(s.conn, ServerMessage::OpponentLeft)])
            .unwrap_or_default();
        info!(
            "room {}: player left, winner by forfeit: {}",
            self.room,
            winner.as_ref().map(|w| w.0.as_str()).unwrap_or("none")
        );
        self.phase = Phase::Finished { winner };
        out
    }
}

fn accept_layout(policy: PlacementPolicy, board: &Board) -> Result<Fleet, PlacementError> {
    match policy {
        PlacementPolicy::Trust => Ok(Fleet::from_board(board)),
        PlacementPolicy::Validate => Fleet::validate(board),
    }
}
