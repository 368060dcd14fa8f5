//! Roster: registration, role assignment and role-partitioned listings.

use crate::models::{GameError, Player, PlayerId, PlayerUpdate, Role};
use crate::store::{PlayerStore, PlayerTx};
use rand::seq::SliceRandom;
use rand::Rng;

/// Share of the roster that becomes mafia, as tenths (rounded down).
pub const MAFIA_TENTHS: usize = 3;

/// Number of mafia for a roster of `players`: `floor(players * 0.3)`.
pub fn mafia_count(players: usize) -> usize {
    players * MAFIA_TENTHS / 10
}

/// Smallest roster that gets at least one mafia member: `ceil(10 / MAFIA_TENTHS)`.
pub const fn min_players_for_mafia() -> usize {
    (10 + MAFIA_TENTHS - 1) / MAFIA_TENTHS
}

/// Role deal inside an open transaction. Returns the number of mafia dealt.
pub(crate) fn assign_roles_in<R: Rng + ?Sized>(
    tx: &mut dyn PlayerTx,
    rng: &mut R,
) -> Result<usize, GameError> {
    let mut players = tx.select_all()?;
    players.sort_by_key(|p| p.id);

    let mafia = mafia_count(players.len());
    let mut roles = vec![Role::Citizen; players.len()];
    roles[..mafia].fill(Role::Mafia);
    roles.shuffle(rng);

    for (player, role) in players.iter().zip(roles) {
        tx.update_fields(player.id, &PlayerUpdate::role(role))?;
    }
    Ok(mafia)
}

pub(crate) fn clear_roles_in(tx: &mut dyn PlayerTx) -> Result<(), GameError> {
    for player in tx.select_all()? {
        tx.update_fields(player.id, &PlayerUpdate::role(Role::Unassigned))?;
    }
    Ok(())
}

/// Manages who is playing and which side they are on.
pub struct RosterManager<'s, S> {
    store: &'s S,
}

impl<'s, S: PlayerStore> RosterManager<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Register a player with no role, zero votes, alive.
    pub fn register(&self, id: PlayerId, username: &str) -> Result<(), GameError> {
        self.store
            .transaction(|tx| tx.insert(Player::new(id, username)))?;
        log::info!("Registered player {} ({})", username, id);
        Ok(())
    }

    /// Number of registered players.
    pub fn count(&self) -> Result<usize, GameError> {
        self.store.transaction(|tx| Ok(tx.select_all()?.len()))
    }

    /// Full roster, ordered by id.
    pub fn players(&self) -> Result<Vec<Player>, GameError> {
        self.store.transaction(|tx| tx.select_all())
    }

    /// Shuffle `floor(N * 0.3)` mafia labels and `N - floor(N * 0.3)` citizen labels and hand
    /// them out to players in ascending id order.
    ///
    /// Calling this again reshuffles and overwrites the previous assignment.
    pub fn assign_roles<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, GameError> {
        let mafia = self.store.transaction(|tx| assign_roles_in(tx, rng))?;
        log::info!("Assigned roles: {} mafia", mafia);
        Ok(mafia)
    }

    /// Set every role back to unassigned.
    pub fn clear_roles(&self) -> Result<(), GameError> {
        self.store.transaction(|tx| clear_roles_in(tx))
    }

    /// Usernames of players still alive.
    pub fn list_alive_usernames(&self) -> Result<Vec<String>, GameError> {
        let alive = self.store.transaction(|tx| tx.select_where(&|p: &Player| p.is_alive()))?;
        Ok(alive.into_iter().map(|p| p.username).collect())
    }

    /// All players holding `role`, dead or alive.
    pub fn list_by_role(&self, role: Role) -> Result<Vec<Player>, GameError> {
        self.store.transaction(|tx| tx.select_where(&|p: &Player| p.role == role))
    }

    /// Usernames of the mafia, for telling mafia members who their partners are.
    pub fn mafia_usernames(&self) -> Result<Vec<String>, GameError> {
        Ok(self
            .list_by_role(Role::Mafia)?
            .into_iter()
            .map(|p| p.username)
            .collect())
    }
}
