#![cfg(feature = "std")]

//! Runtime configuration for the server, the networked client and bot pacing.

use std::time::Duration;

use crate::bot::Difficulty;
use crate::protocol::{MatchMode, RoomId};

/// Default listen address; the port matches what web clients expect.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Maximum frame size (64 KiB); a full board message is a few hundred bytes.
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

/// Default timeout for writing one frame (30 seconds).
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether the server re-checks boards submitted by players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    /// Accept whatever grid the player sends; ships are recovered from it.
    Trust,
    /// Require a legal fleet layout and reject anything else.
    #[default]
    Validate,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub placement_policy: PlacementPolicy,
    pub max_message_size: u32,
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            placement_policy: PlacementPolicy::default(),
            max_message_size: MAX_MESSAGE_SIZE,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Simulated thinking time between consecutive bot shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotPacing {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl BotPacing {
    /// No delay at all; for tests and simulations.
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Draw a delay in `[min_delay, max_delay]`.
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..=max))
    }
}

impl Default for BotPacing {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(600),
            max_delay: Duration::from_millis(1200),
        }
    }
}

/// Settings for a bot-driven networked player.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect: String,
    pub id: String,
    pub name: String,
    pub mode: MatchMode,
    pub room: Option<RoomId>,
    pub difficulty: Difficulty,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect: "127.0.0.1:3000".to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            name: "Bot".to_string(),
            mode: MatchMode::Random,
            room: None,
            difficulty: Difficulty::default(),
        }
    }
}
