//! Scripted opponent. Targets are chosen purely from the bot's view of the
//! opponent board (Empty/Hit/Miss/Sunk) and its own shot history.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use rand::Rng;

use crate::board::Board;
use crate::common::{Cell, Coord, Orientation, ShotOutcome};

/// Strength tier of the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    /// Uniformly random unshot cell.
    Easy,
    /// Hunt at random, then probe the four neighbours of every hit.
    #[default]
    Medium,
    /// Parity hunt, then directional probing once a ship's axis is known.
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err("difficulty must be one of easy, medium, hard"),
        }
    }
}

/// Targeting state for one match.
#[derive(Debug, Clone)]
pub struct Bot {
    difficulty: Difficulty,
    queue: VecDeque<Coord>,
    /// Hits on the ship currently being chased (Hard only).
    chase: Vec<Coord>,
    axis: Option<Orientation>,
}

impl Bot {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            queue: VecDeque::new(),
            chase: Vec::new(),
            axis: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Axis inferred for the ship being chased, if any.
    pub fn axis(&self) -> Option<Orientation> {
        self.axis
    }

    /// Pending follow-up targets, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Coord> {
        self.queue.iter()
    }

    /// Pick the next cell to shoot. `None` only when no Empty cell is left.
    pub fn next_target<R: Rng + ?Sized>(&mut self, rng: &mut R, view: &Board) -> Option<Coord> {
        if self.difficulty == Difficulty::Easy {
            return random_cell(rng, view.empty_cells());
        }

        // stale entries were resolved after they were queued
        while let Some((r, c)) = self.queue.pop_front() {
            if view.get(r, c) == Some(Cell::Empty) {
                return Some((r, c));
            }
        }

        if self.difficulty == Difficulty::Hard {
            // probes ran dry without a sink; start hunting afresh
            self.chase.clear();
            self.axis = None;
            let parity = random_cell(rng, view.empty_cells().filter(|&(r, c)| (r + c) % 2 == 0));
            if parity.is_some() {
                return parity;
            }
        }
        random_cell(rng, view.empty_cells())
    }

    /// Feed back the outcome of the last shot. `view` must already include
    /// that outcome, perimeter reveal included.
    pub fn record(&mut self, view: &Board, target: Coord, outcome: &ShotOutcome) {
        if !outcome.hit {
            return;
        }
        match self.difficulty {
            Difficulty::Easy => {}
            Difficulty::Medium => self.enqueue_neighbours(view, target),
            Difficulty::Hard => {
                if outcome.sunk {
                    self.queue.clear();
                    self.chase.clear();
                    self.axis = None;
                    return;
                }
                self.chase.push(target);
                if self.chase.len() < 2 {
                    self.enqueue_neighbours(view, target);
                    return;
                }
                let prev = self.chase[self.chase.len() - 2];
                self.axis = if prev.0 == target.0 {
                    Some(Orientation::Horizontal)
                } else if prev.1 == target.1 {
                    Some(Orientation::Vertical)
                } else {
                    None
                };
                match self.axis {
                    Some(axis) => {
                        self.queue.clear();
                        self.probe_run_ends(view, axis);
                    }
                    None => self.enqueue_neighbours(view, target),
                }
            }
        }
    }

    fn enqueue_neighbours(&mut self, view: &Board, (r, c): Coord) {
        let neighbours = [
            (r.wrapping_sub(1), c),
            (r + 1, c),
            (r, c.wrapping_sub(1)),
            (r, c + 1),
        ];
        for n in neighbours {
            self.push_if_open(view, n);
        }
    }

    /// Queue the cell just before and just after the run of chased hits.
    fn probe_run_ends(&mut self, view: &Board, axis: Orientation) {
        let key = |&(r, c): &Coord| match axis {
            Orientation::Horizontal => c,
            Orientation::Vertical => r,
        };
        let (Some(first), Some(last)) = (
            self.chase.iter().min_by_key(|p| key(*p)).copied(),
            self.chase.iter().max_by_key(|p| key(*p)).copied(),
        ) else {
            return;
        };
        let (before, after) = match axis {
            Orientation::Horizontal => ((first.0, first.1.wrapping_sub(1)), (last.0, last.1 + 1)),
            Orientation::Vertical => ((first.0.wrapping_sub(1), first.1), (last.0 + 1, last.1)),
        };
        self.push_if_open(view, after);
        self.push_if_open(view, before);
    }

    fn push_if_open(&mut self, view: &Board, (r, c): Coord) {
        if view.get(r, c) == Some(Cell::Empty) && !self.queue.contains(&(r, c)) {
            self.queue.push_back((r, c));
        }
    }
}

fn random_cell<R, I>(rng: &mut R, cells: I) -> Option<Coord>
where
    R: Rng + ?Sized,
    I: Iterator<Item = Coord>,
{
    let cells: Vec<Coord> = cells.collect();
    if cells.is_empty() {
        return None;
    }
    Some(cells[rng.random_range(0..cells.len())])
}
