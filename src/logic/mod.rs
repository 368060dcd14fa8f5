//! Game logic: roster management, the round engine and the session that sequences them.

mod roster;
mod round;
mod session;

pub use roster::{mafia_count, min_players_for_mafia, RosterManager, MAFIA_TENTHS};
pub use round::RoundEngine;
pub use session::GameSession;
