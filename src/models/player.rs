//! Player, Role and the partial-update record used by stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a player, assigned by whoever delivers commands (e.g. a chat user id).
pub type PlayerId = i64;

/// Secret role of a player in the current session.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unassigned,
    Mafia,
    Citizen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unassigned => "unassigned",
            Role::Mafia => "mafia",
            Role::Citizen => "citizen",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored role label is not one of the known roles.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(Role::Unassigned),
            "mafia" => Ok(Role::Mafia),
            "citizen" => Ok(Role::Citizen),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A registered participant and their per-session state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub role: Role,
    /// Votes received during the current night round.
    pub mafia_votes: u32,
    /// Votes received during the current day round.
    pub citizen_votes: u32,
    pub has_voted: bool,
    pub is_dead: bool,
}

impl Player {
    /// Create a freshly registered player: no role, no votes, alive.
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            role: Role::Unassigned,
            mafia_votes: 0,
            citizen_votes: 0,
            has_voted: false,
            is_dead: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_mafia(&self) -> bool {
        self.role == Role::Mafia
    }

    /// Apply a partial update in place. Fields left as `None` are untouched.
    pub fn apply(&mut self, update: &PlayerUpdate) {
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(votes) = update.mafia_votes {
            self.mafia_votes = votes;
        }
        if let Some(votes) = update.citizen_votes {
            self.citizen_votes = votes;
        }
        if let Some(voted) = update.has_voted {
            self.has_voted = voted;
        }
        if let Some(dead) = update.is_dead {
            self.is_dead = dead;
        }
    }
}

/// Field map for a partial update of one player record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PlayerUpdate {
    pub role: Option<Role>,
    pub mafia_votes: Option<u32>,
    pub citizen_votes: Option<u32>,
    pub has_voted: Option<bool>,
    pub is_dead: Option<bool>,
}

impl PlayerUpdate {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn voted() -> Self {
        Self {
            has_voted: Some(true),
            ..Self::default()
        }
    }

    pub fn killed() -> Self {
        Self {
            is_dead: Some(true),
            ..Self::default()
        }
    }

    /// Zero both tallies and the voted flag; optionally revive.
    pub fn round_reset(include_deaths: bool) -> Self {
        Self {
            mafia_votes: Some(0),
            citizen_votes: Some(0),
            has_voted: Some(false),
            is_dead: include_deaths.then_some(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
