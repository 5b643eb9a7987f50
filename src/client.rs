#![cfg(feature = "std")]

//! A networked player driven by a [`Bot`]: it matchmakes, places a random
//! fleet and plays the match to its end against the session server.

use log::{debug, info};
use rand::rngs::SmallRng;
use tokio::sync::oneshot;

use crate::board::Board;
use crate::bot::Bot;
use crate::common::{Coord, ShotOutcome};
use crate::protocol::{
    from_wire, ClientMessage, MatchMode, PlayerId, PlayerIdentity, RoomId, ServerMessage, PROTOCOL_VERSION,
};
use crate::transport::ClientTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientResult {
    Won,
    Lost,
    OpponentLeft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOutcome {
    pub result: ClientResult,
    pub room: RoomId,
    pub shots: u32,
    pub hits: u32,
}

pub struct ClientNode {
    identity: PlayerIdentity,
    mode: MatchMode,
    room: Option<RoomId>,
    bot: Bot,
    transport: ClientTransport,
    room_created: Option<oneshot::Sender<RoomId>>,
    own: Board,
    view: Board,
    last_target: Option<Coord>,
    shots: u32,
    hits: u32,
}

impl ClientNode {
    /// A player looking for a random opponent.
    pub fn new(identity: PlayerIdentity, bot: Bot, transport: ClientTransport) -> Self {
        Self {
            identity,
            mode: MatchMode::Random,
            room: None,
            bot,
            transport,
            room_created: None,
            own: Board::new(),
            view: Board::new(),
            last_target: None,
            shots: 0,
            hits: 0,
        }
    }

    /// Play with a friend instead: create a room (`None`) or join one.
    pub fn friend(mut self, room: Option<RoomId>) -> Self {
        self.mode = MatchMode::Friend;
        self.room = room;
        self
    }

    /// Receive the token once the server has created our room.
    pub fn on_room_created(mut self, tx: oneshot::Sender<RoomId>) -> Self {
        self.room_created = Some(tx);
        self
    }

    pub fn id(&self) -> &PlayerId {
        &self.identity.id
    }

    /// Our board as the server reported it, with the opponent's shots applied.
    pub fn own_board(&self) -> &Board {
        &self.own
    }

    /// What we know of the opponent's board.
    pub fn target_view(&self) -> &Board {
        &self.view
    }

    async fn handshake(&mut self) -> anyhow::Result<()> {
        self.transport
            .send(ClientMessage::Hello {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match self.transport.recv().await? {
            ServerMessage::Welcome { version } if version == PROTOCOL_VERSION => Ok(()),
            ServerMessage::Welcome { version } => Err(anyhow::anyhow!(
                "Protocol version mismatch in Welcome: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow::anyhow!("Expected Welcome, got {:?}", other)),
        }
    }

    async fn matchmake(&mut self) -> anyhow::Result<RoomId> {
        self.transport
            .send(ClientMessage::Matchmake {
                mode: self.mode,
                room: self.room.clone(),
                player: self.identity.clone(),
            })
            .await?;
        loop {
            match self.transport.recv().await? {
                ServerMessage::RoomCreated { room } => {
                    info!("{}: created room {}", self.identity.id, room);
                    if let Some(tx) = self.room_created.take() {
                        let _ = tx.send(room);
                    }
                }
                ServerMessage::Paired { room, opponent } => {
                    info!("{}: paired with {} in {}", self.identity.id, opponent.id, room);
                    return Ok(room);
                }
                ServerMessage::JoinRejected { reason } => {
                    return Err(anyhow::anyhow!("Join rejected: {:?}", reason));
                }
                other => debug!("{}: ignoring {:?} while matchmaking", self.identity.id, other),
            }
        }
    }

    async fn fire(&mut self, rng: &mut SmallRng, room: &RoomId) -> anyhow::Result<()> {
        let (row, col) = self
            .bot
            .next_target(rng, &self.view)
            .ok_or_else(|| anyhow::anyhow!("No cell left to shoot"))?;
        self.last_target = Some((row, col));
        self.transport
            .send(ClientMessage::SubmitShot {
                room: room.clone(),
                row: row as u8,
                col: col as u8,
            })
            .await
    }

    pub async fn run(&mut self, rng: &mut SmallRng) -> anyhow::Result<ClientOutcome> {
        self.handshake().await?;
        let room = self.matchmake().await?;

        let (board, _) = Board::random_full_placement(rng).map_err(|e| anyhow::anyhow!(e))?;
        self.transport
            .send(ClientMessage::SubmitPlacement {
                room: room.clone(),
                board,
            })
            .await?;

        loop {
            match self.transport.recv().await? {
                ServerMessage::ReadyConfirmed | ServerMessage::PeerReady => {}
                ServerMessage::PlacementRejected { reason } => {
                    return Err(anyhow::anyhow!("Placement rejected: {}", reason));
                }
                ServerMessage::MatchStart {
                    own_board,
                    opponent_view,
                    is_my_turn,
                } => {
                    self.own = own_board;
                    self.view = opponent_view;
                    if is_my_turn {
                        self.fire(rng, &room).await?;
                    }
                }
                ServerMessage::ShotResult {
                    row,
                    col,
                    hit,
                    sunk,
                    sunk_cells,
                    shooter,
                    game_over,
                    winner,
                } => {
                    let (row, col) = (row as usize, col as usize);
                    let sunk_cells = from_wire(&sunk_cells);
                    let mine = shooter == self.identity.id;
                    let board = if mine { &mut self.view } else { &mut self.own };
                    board
                        .record_shot(row, col, hit, &sunk_cells)
                        .map_err(|e| anyhow::anyhow!(e))?;
                    if mine {
                        self.shots += 1;
                        if hit {
                            self.hits += 1;
                        }
                        let outcome = ShotOutcome {
                            hit,
                            sunk,
                            sunk_cells,
                            game_over,
                        };
                        self.bot.record(&self.view, (row, col), &outcome);
                    }
                    if game_over {
                        let result = if winner.as_ref() == Some(&self.identity.id) {
                            ClientResult::Won
                        } else {
                            ClientResult::Lost
                        };
                        return Ok(self.finish(result, room));
                    }
                    if mine && hit {
                        self.fire(rng, &room).await?;
                    }
                }
                ServerMessage::TurnChanged { is_my_turn } => {
                    if is_my_turn {
                        self.fire(rng, &room).await?;
                    }
                }
                ServerMessage::OpponentLeft => {
                    info!("{}: opponent left room {}", self.identity.id, room);
                    return Ok(self.finish(ClientResult::OpponentLeft, room));
                }
                other => debug!("{}: ignoring {:?}", self.identity.id, other),
            }
        }
    }

    fn finish(&self, result: ClientResult, room: RoomId) -> ClientOutcome {
        debug!(
            "{}: finished {:?} after {} shots (last {:?})",
            self.identity.id, result, self.shots, self.last_target
        );
        ClientOutcome {
            result,
            room,
            shots: self.shots,
            hits: self.hits,
        }
    }
}
