#![cfg(feature = "std")]

//! Runs a [`LocalMatch`] as a task: human shots arrive over a channel and
//! bot shots are scheduled after a randomized delay, never awaited inline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use rand::rngs::SmallRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::board::Board;
use crate::local::{LocalMatch, ShotReport, Turn};
use crate::settings::BotPacing;

/// A bot shot waiting for its delay to elapse. When the delay is up it
/// sends its epoch on the wake channel, unless it was cancelled first.
/// Dropping it cancels it.
pub struct ScheduledShot {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ScheduledShot {
    pub fn schedule(delay: Duration, epoch: u64, wake: UnboundedSender<u64>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                let _ = wake.send(epoch);
            }
        });
        Self { cancelled, task }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ScheduledShot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Shoot { row: usize, col: usize },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    /// A shot was applied; boards are the state right after it.
    Shot {
        report: ShotReport,
        human_board: Board,
        target_view: Board,
    },
    /// The human's shot was not accepted (wrong turn or cell already shot).
    Rejected { row: usize, col: usize },
    Finished { winner: Turn },
}

/// Sending side for human intents.
#[derive(Clone)]
pub struct LocalHandle {
    commands: UnboundedSender<LocalCommand>,
}

impl LocalHandle {
    pub fn shoot(&self, row: usize, col: usize) -> anyhow::Result<()> {
        self.commands
            .send(LocalCommand::Shoot { row, col })
            .map_err(|_| anyhow::anyhow!("Match is over"))
    }

    pub fn quit(&self) {
        let _ = self.commands.send(LocalCommand::Quit);
    }
}

/// Start the match task. It ends on game over, on [`LocalHandle::quit`] or
/// when every handle is dropped, and returns the final match state.
pub fn spawn_local_match(
    game: LocalMatch,
    rng: SmallRng,
    pacing: BotPacing,
) -> (LocalHandle, UnboundedReceiver<LocalEvent>, JoinHandle<LocalMatch>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let actor = LocalActor {
        game,
        rng,
        pacing,
        events: event_tx,
        epoch: 0,
        pending: None,
    };
    let task = tokio::spawn(actor.run(cmd_rx));
    (LocalHandle { commands: cmd_tx }, event_rx, task)
}

struct LocalActor {
    game: LocalMatch,
    rng: SmallRng,
    pacing: BotPacing,
    events: UnboundedSender<LocalEvent>,
    epoch: u64,
    pending: Option<ScheduledShot>,
}

impl LocalActor {
    async fn run(mut self, mut commands: UnboundedReceiver<LocalCommand>) -> LocalMatch {
        let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(LocalCommand::Shoot { row, col }) => {
                        let Some(report) = self.game.human_shot(row, col) else {
                            self.emit(LocalEvent::Rejected { row, col });
                            continue;
                        };
                        if self.settle(report) {
                            break;
                        }
                        if self.game.turn() == Turn::Bot {
                            self.schedule(&wake_tx);
                        }
                    }
                    Some(LocalCommand::Quit) | None => {
                        debug!("local match abandoned");
                        break;
                    }
                },
                Some(epoch) = wake_rx.recv() => {
                    if epoch != self.epoch {
                        debug!("stale bot shot {} dropped", epoch);
                        continue;
                    }
                    self.pending = None;
                    let Some(report) = self.game.bot_shot(&mut self.rng) else {
                        continue;
                    };
                    if self.settle(report) {
                        break;
                    }
                    if self.game.turn() == Turn::Bot {
                        self.schedule(&wake_tx);
                    }
                }
            }
        }
        if let Some(shot) = self.pending.take() {
            shot.cancel();
        }
        self.game
    }

    fn schedule(&mut self, wake: &UnboundedSender<u64>) {
        self.epoch += 1;
        let delay = self.pacing.sample(&mut self.rng);
        self.pending = Some(ScheduledShot::schedule(delay, self.epoch, wake.clone()));
    }

    /// Publish a shot. Returns true when it ended the match.
    fn settle(&mut self, report: ShotReport) -> bool {
        self.emit(LocalEvent::Shot {
            report,
            human_board: *self.game.human_board(),
            target_view: self.game.target_view(),
        });
        match self.game.winner() {
            Some(winner) => {
                self.emit(LocalEvent::Finished { winner });
                true
            }
            None => false,
        }
    }

    fn emit(&self, event: LocalEvent) {
        let _ = self.events.send(event);
    }
}
