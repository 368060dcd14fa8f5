//! Player table access: the transactional store every game operation goes through.
//!
//! Game logic never touches rows directly. It calls [`PlayerStore::transaction`] with a
//! closure that reads and writes through a [`PlayerTx`]; returning `Ok` commits every
//! write in one step, returning `Err` discards all of them.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{GameError, Player, PlayerId, PlayerUpdate};

/// Reads and writes available inside one transaction.
pub trait PlayerTx {
    /// Insert a new record. Fails with [`GameError::DuplicateId`] if the id exists.
    fn insert(&mut self, player: Player) -> Result<(), GameError>;

    /// All records, ordered by ascending id.
    fn select_all(&mut self) -> Result<Vec<Player>, GameError>;

    /// Records matching `predicate`, ordered by ascending id.
    fn select_where(
        &mut self,
        predicate: &dyn Fn(&Player) -> bool,
    ) -> Result<Vec<Player>, GameError> {
        Ok(self
            .select_all()?
            .into_iter()
            .filter(|p| predicate(p))
            .collect())
    }

    /// Single record by id.
    fn select_by_id(&mut self, id: PlayerId) -> Result<Option<Player>, GameError> {
        Ok(self.select_where(&|p: &Player| p.id == id)?.into_iter().next())
    }

    /// Partial update of one record. Updating an unknown id is a no-op.
    fn update_fields(&mut self, id: PlayerId, update: &PlayerUpdate) -> Result<(), GameError>;
}

/// A keyed player table with transactional read-modify-write.
pub trait PlayerStore {
    /// Run `f` as one transaction. Writes become visible only if `f` returns `Ok` and the
    /// commit succeeds; otherwise the table is left at its last committed state.
    fn transaction<T, F>(&self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut dyn PlayerTx) -> Result<T, GameError>;
}
