//! Data structures for a Mafia session: players, roles, round outcomes, session phase.

mod player;
mod round;
mod session;

pub use player::{Player, PlayerId, PlayerUpdate, Role, UnknownRole};
pub use round::{RoundKind, RoundOutcome, Winner};
pub use session::{GameError, GameSnapshot, Phase};
