//! RoundKind, Winner and the outcome of resolving a round.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tally a vote counts toward.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Night: mafia pick a victim.
    Mafia,
    /// Day: every living player votes someone out.
    Citizen,
}

/// Side that won the game.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Mafia,
    Citizens,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Mafia => "mafia",
            Winner::Citizens => "citizens",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened when a round was resolved.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub kind: RoundKind,
    /// Round number the outcome belongs to (1-based).
    pub round: u32,
    /// Username of the eliminated player; `None` when nobody was eliminated.
    pub eliminated: Option<String>,
    /// Set when this resolution ended the game.
    pub winner: Option<Winner>,
}
