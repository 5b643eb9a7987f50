#![cfg(feature = "std")]

//! Player registry and match outcome records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::protocol::{PlayerId, PlayerIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub shots: u32,
    pub hits: u32,
}

impl PlayerRecord {
    fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            wins: 0,
            losses: 0,
            shots: 0,
            hits: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Where finished matches are recorded. The session server owns one store
/// and calls it from its event loop only.
pub trait StatsStore: Send {
    /// Insert the player or refresh their display name.
    fn register(&mut self, player: &PlayerIdentity);

    fn record_outcome(&mut self, id: &PlayerId, result: MatchResult, shots: u32, hits: u32);

    /// Best players first: most wins, then fewest losses, then id.
    fn top_players(&self, limit: usize) -> Vec<PlayerRecord>;

    fn player(&self, id: &PlayerId) -> Option<PlayerRecord>;
}

/// In-process store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStats {
    players: HashMap<PlayerId, PlayerRecord>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl StatsStore for MemoryStats {
    fn register(&mut self, player: &PlayerIdentity) {
        self.players
            .entry(player.id.clone())
            .and_modify(|r| r.name = player.name.clone())
            .or_insert_with(|| PlayerRecord::new(player.id.clone(), player.name.clone()));
    }

    fn record_outcome(&mut self, id: &PlayerId, result: MatchResult, shots: u32, hits: u32) {
        let record = self
            .players
            .entry(id.clone())
            .or_insert_with(|| PlayerRecord::new(id.clone(), id.0.clone()));
        match result {
            MatchResult::Win => record.wins += 1,
            MatchResult::Loss => record.losses += 1,
        }
        record.shots += shots;
        record.hits += hits;
    }

    fn top_players(&self, limit: usize) -> Vec<PlayerRecord> {
        let mut ranked: Vec<PlayerRecord> = self.players.values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(a.losses.cmp(&b.losses))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        ranked
    }

    fn player(&self, id: &PlayerId) -> Option<PlayerRecord> {
        self.players.get(id).cloned()
    }
}
