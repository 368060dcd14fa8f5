//! In-process player table.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::models::{GameError, Player, PlayerId, PlayerUpdate};
use crate::store::{PlayerStore, PlayerTx};

/// Player table kept in memory. Transactions hold the lock for their whole duration and
/// work on a copy that replaces the table on commit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<PlayerId, Player>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct MemoryTx<'a> {
    rows: &'a mut BTreeMap<PlayerId, Player>,
}

impl PlayerTx for MemoryTx<'_> {
    fn insert(&mut self, player: Player) -> Result<(), GameError> {
        if self.rows.contains_key(&player.id) {
            return Err(GameError::DuplicateId(player.id));
        }
        self.rows.insert(player.id, player);
        Ok(())
    }

    fn select_all(&mut self) -> Result<Vec<Player>, GameError> {
        Ok(self.rows.values().cloned().collect())
    }

    fn select_by_id(&mut self, id: PlayerId) -> Result<Option<Player>, GameError> {
        Ok(self.rows.get(&id).cloned())
    }

    fn update_fields(&mut self, id: PlayerId, update: &PlayerUpdate) -> Result<(), GameError> {
        if let Some(p) = self.rows.get_mut(&id) {
            p.apply(update);
        }
        Ok(())
    }
}

impl PlayerStore for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut dyn PlayerTx) -> Result<T, GameError>,
    {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| GameError::TransactionFailure("player table lock poisoned".into()))?;
        let mut working = rows.clone();
        let result = f(&mut MemoryTx { rows: &mut working });
        match result {
            Ok(value) => {
                *rows = working;
                Ok(value)
            }
            Err(e) => {
                log::debug!("Rolled back player transaction: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = MemoryStore::new();
        store.transaction(|tx| tx.insert(Player::new(1, "Ann"))).unwrap();
        let err = store
            .transaction(|tx| tx.insert(Player::new(1, "Other")))
            .unwrap_err();
        assert_eq!(err, GameError::DuplicateId(1));
    }

    #[test]
    fn failed_transaction_commits_nothing() {
        let store = MemoryStore::new();
        store.transaction(|tx| tx.insert(Player::new(1, "Ann"))).unwrap();

        let result: Result<(), _> = store.transaction(|tx| {
            tx.insert(Player::new(2, "Ben"))?;
            tx.update_fields(1, &PlayerUpdate::killed())?;
            Err(GameError::TransactionFailure("boom".into()))
        });
        assert!(result.is_err());

        let rows = store.transaction(|tx| tx.select_all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_dead);
    }

    #[test]
    fn select_all_is_ordered_by_id() {
        let store = MemoryStore::new();
        store
            .transaction(|tx| {
                tx.insert(Player::new(30, "C"))?;
                tx.insert(Player::new(10, "A"))?;
                tx.insert(Player::new(20, "B"))
            })
            .unwrap();
        let ids: Vec<_> = store
            .transaction(|tx| tx.select_all())
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn update_of_unknown_id_is_noop() {
        let store = MemoryStore::new();
        store
            .transaction(|tx| tx.update_fields(99, &PlayerUpdate::killed()))
            .unwrap();
        assert!(store.transaction(|tx| tx.select_all()).unwrap().is_empty());
    }
}
