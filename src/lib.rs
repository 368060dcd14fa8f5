//! Mafia party game tracker: library with models, player store and game logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::Config;
pub use logic::{mafia_count, min_players_for_mafia, GameSession, RosterManager, RoundEngine};
pub use models::{
    GameError, GameSnapshot, Phase, Player, PlayerId, PlayerUpdate, Role, RoundKind,
    RoundOutcome, Winner,
};
pub use store::{MemoryStore, PlayerStore, PlayerTx, SqliteStore};
