//! Single-player match: a human against the bot, both boards held locally
//! and resolved with the same rules the session server uses.

use rand::Rng;

use crate::board::Board;
use crate::bot::{Bot, Difficulty};
use crate::common::{BoardError, ShotOutcome};
use crate::fleet::Fleet;
use crate::shot::resolve_shot;

/// Who may shoot next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Turn {
    Human,
    Bot,
}

impl Turn {
    pub fn other(self) -> Turn {
        match self {
            Turn::Human => Turn::Bot,
            Turn::Bot => Turn::Human,
        }
    }
}

/// One applied shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotReport {
    pub shooter: Turn,
    pub row: usize,
    pub col: usize,
    pub outcome: ShotOutcome,
}

#[derive(Debug, Clone)]
struct Side {
    board: Board,
    fleet: Fleet,
    shots: u32,
    hits: u32,
}

impl Side {
    fn new((board, fleet): (Board, Fleet)) -> Self {
        Self {
            board,
            fleet,
            shots: 0,
            hits: 0,
        }
    }
}

/// Human vs bot match state. The human shoots first; a hit keeps the turn,
/// a miss passes it.
#[derive(Debug, Clone)]
pub struct LocalMatch {
    human: Side,
    computer: Side,
    bot: Bot,
    turn: Turn,
    winner: Option<Turn>,
}

impl LocalMatch {
    /// Both fleets placed at random.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> Result<Self, BoardError> {
        let human = Board::random_full_placement(rng)?;
        let computer = Board::random_full_placement(rng)?;
        Ok(Self::with_fleets(human, computer, difficulty))
    }

    /// Start from fleets placed elsewhere (e.g. by hand through
    /// [`Board::can_place`] and [`Board::place`]).
    pub fn with_fleets(human: (Board, Fleet), computer: (Board, Fleet), difficulty: Difficulty) -> Self {
        Self {
            human: Side::new(human),
            computer: Side::new(computer),
            bot: Bot::new(difficulty),
            turn: Turn::Human,
            winner: None,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn winner(&self) -> Option<Turn> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.bot.difficulty()
    }

    /// The human's own board, ships visible.
    pub fn human_board(&self) -> &Board {
        &self.human.board
    }

    /// The bot's board as the human may see it.
    pub fn target_view(&self) -> Board {
        self.computer.board.opponent_view()
    }

    /// `(shots, hits)` fired by the given side.
    pub fn stats(&self, side: Turn) -> (u32, u32) {
        let s = match side {
            Turn::Human => &self.human,
            Turn::Bot => &self.computer,
        };
        (s.shots, s.hits)
    }

    /// Apply the human's shot. `None` when it is not the human's turn, the
    /// match is over or the cell can't be shot.
    pub fn human_shot(&mut self, row: usize, col: usize) -> Option<ShotReport> {
        if self.is_over() || self.turn != Turn::Human {
            return None;
        }
        let outcome = resolve_shot(&mut self.computer.board, &mut self.computer.fleet, row, col).ok()?;
        Some(self.settle(Turn::Human, row, col, outcome))
    }

    /// Let the bot take one shot. `None` when it is not the bot's turn or the
    /// match is over.
    pub fn bot_shot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ShotReport> {
        if self.is_over() || self.turn != Turn::Bot {
            return None;
        }
        let view = self.human.board.opponent_view();
        let (row, col) = self.bot.next_target(rng, &view)?;
        let outcome = resolve_shot(&mut self.human.board, &mut self.human.fleet, row, col).ok()?;
        let view = self.human.board.opponent_view();
        self.bot.record(&view, (row, col), &outcome);
        Some(self.settle(Turn::Bot, row, col, outcome))
    }

    fn settle(&mut self, shooter: Turn, row: usize, col: usize, outcome: ShotOutcome) -> ShotReport {
        let side = match shooter {
            Turn::Human => &mut self.human,
            Turn::Bot => &mut self.computer,
        };
        side.shots += 1;
        if outcome.hit {
            side.hits += 1;
        }
        if outcome.game_over {
            self.winner = Some(shooter);
        } else if !outcome.hit {
            self.turn = shooter.other();
        }
        ShotReport {
            shooter,
            row,
            col,
            outcome,
        }
    }
}
