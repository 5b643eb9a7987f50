#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitboard;
mod board;
mod bot;
mod common;
mod config;
mod fleet;
mod local;
mod ship;
mod shot;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod hub;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod manager;
#[cfg(feature = "std")]
pub mod matchmaker;
#[cfg(feature = "std")]
pub mod pacing;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod settings;
#[cfg(feature = "std")]
pub mod stats;
#[cfg(feature = "std")]
pub mod transport;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use bot::*;
pub use common::*;
pub use config::*;
pub use fleet::*;
pub use local::*;
pub use ship::*;
pub use shot::*;

#[cfg(feature = "std")]
pub use client::{ClientNode, ClientOutcome, ClientResult};
#[cfg(feature = "std")]
pub use hub::{serve_tcp, Connection, Hub, HubHandle};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use manager::{SessionManager, StatusSnapshot};
#[cfg(feature = "std")]
pub use protocol::*;
#[cfg(feature = "std")]
pub use session::{ConnId, Dispatch, MatchSession, Phase};
#[cfg(feature = "std")]
pub use settings::*;
#[cfg(feature = "std")]
pub use stats::{MatchResult, MemoryStats, PlayerRecord, StatsStore};
#[cfg(feature = "std")]
pub use transport::tcp::TcpTransport;
