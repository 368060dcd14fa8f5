//! GameError, Phase and the public snapshot of a session.

use crate::models::player::PlayerId;
use crate::models::round::{RoundKind, Winner};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during game operations.
///
/// Rejected votes and rounds without an elimination are not errors; they come back as
/// `false` / `None` from the corresponding calls.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GameError {
    /// A player with this id is already registered.
    #[error("Player {0} is already registered")]
    DuplicateId(PlayerId),
    /// The store failed to commit or roll back; nothing from the operation was kept.
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
    /// Too few players for at least one mafia member.
    #[error("Need at least {required} players to start (registered {registered})")]
    NotEnoughPlayers { required: usize, registered: usize },
    /// The session is not in a phase that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
}

/// Current phase of the session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "winner")]
pub enum Phase {
    /// Registering players; roles not assigned yet.
    #[default]
    Setup,
    /// Mafia are voting.
    Night,
    /// Everyone alive is voting.
    Day,
    /// Game over.
    Finished(Winner),
}

impl Phase {
    /// Tally that votes count toward in this phase, if voting is open.
    pub fn round_kind(&self) -> Option<RoundKind> {
        match self {
            Phase::Night => Some(RoundKind::Mafia),
            Phase::Day => Some(RoundKind::Citizen),
            Phase::Setup | Phase::Finished(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished(_))
    }
}

/// Public view of a session: safe to show to every player (no roles).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(flatten)]
    pub phase: Phase,
    pub round: u32,
    pub registered: usize,
    pub alive: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voting_phases_map_to_round_kinds() {
        assert_eq!(Phase::Night.round_kind(), Some(RoundKind::Mafia));
        assert_eq!(Phase::Day.round_kind(), Some(RoundKind::Citizen));
        assert_eq!(Phase::Setup.round_kind(), None);
        assert_eq!(Phase::Finished(Winner::Mafia).round_kind(), None);
        assert!(Phase::Finished(Winner::Citizens).is_terminal());
    }

    #[test]
    fn phase_serializes_with_winner() {
        let json = serde_json::to_value(Phase::Finished(Winner::Citizens)).unwrap();
        assert_eq!(json, serde_json::json!({ "phase": "finished", "winner": "citizens" }));
        let json = serde_json::to_value(Phase::Night).unwrap();
        assert_eq!(json, serde_json::json!({ "phase": "night" }));
    }
}
