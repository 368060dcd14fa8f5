//! SQLite-backed player table.

use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Type, Value};
use rusqlite::ffi::ErrorCode;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};

use crate::models::{GameError, Player, PlayerId, PlayerUpdate, Role};
use crate::store::{PlayerStore, PlayerTx};

const SELECT_COLUMNS: &str =
    "SELECT player_id, username, role, mafia_vote, citizen_vote, voted, dead FROM players";

/// Player table in a SQLite database. Each [`PlayerStore::transaction`] is one SQL
/// transaction; dropping it without commit rolls back.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the `players` table exists.
    /// Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self, GameError> {
        let conn = Connection::open(path).map_err(|e| {
            GameError::TransactionFailure(format!("failed to open database at {path}: {e}"))
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;

             CREATE TABLE IF NOT EXISTS players (
                 player_id    INTEGER PRIMARY KEY,
                 username     TEXT NOT NULL,
                 role         TEXT NOT NULL DEFAULT 'unassigned',
                 mafia_vote   INTEGER NOT NULL DEFAULT 0,
                 citizen_vote INTEGER NOT NULL DEFAULT 0,
                 voted        INTEGER NOT NULL DEFAULT 0,
                 dead         INTEGER NOT NULL DEFAULT 0
             );",
        )
        .map_err(store_failure)?;

        log::debug!("Opened player table at {}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, GameError> {
        self.conn
            .lock()
            .map_err(|_| GameError::TransactionFailure("database mutex poisoned".into()))
    }
}

fn store_failure(e: rusqlite::Error) -> GameError {
    GameError::TransactionFailure(e.to_string())
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let role: String = row.get(2)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Player {
        id: row.get(0)?,
        username: row.get(1)?,
        role,
        mafia_votes: row.get(3)?,
        citizen_votes: row.get(4)?,
        has_voted: row.get(5)?,
        is_dead: row.get(6)?,
    })
}

struct SqliteTx<'a> {
    tx: &'a Transaction<'a>,
}

impl SqliteTx<'_> {
    fn query(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Player>, GameError> {
        let mut stmt = self.tx.prepare(sql).map_err(store_failure)?;
        let players = stmt
            .query_map(args, player_from_row)
            .map_err(store_failure)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_failure)?;
        Ok(players)
    }
}

impl PlayerTx for SqliteTx<'_> {
    fn insert(&mut self, player: Player) -> Result<(), GameError> {
        self.tx
            .execute(
                "INSERT INTO players (player_id, username, role, mafia_vote, citizen_vote, voted, dead)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    player.id,
                    player.username,
                    player.role.as_str(),
                    player.mafia_votes,
                    player.citizen_votes,
                    player.has_voted,
                    player.is_dead,
                ],
            )
            .map_err(|e| {
                if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
                    GameError::DuplicateId(player.id)
                } else {
                    store_failure(e)
                }
            })?;
        Ok(())
    }

    fn select_all(&mut self) -> Result<Vec<Player>, GameError> {
        self.query(&format!("{SELECT_COLUMNS} ORDER BY player_id"), &[])
    }

    fn select_by_id(&mut self, id: PlayerId) -> Result<Option<Player>, GameError> {
        Ok(self
            .query(&format!("{SELECT_COLUMNS} WHERE player_id = ?1"), &[&id])?
            .into_iter()
            .next())
    }

    fn update_fields(&mut self, id: PlayerId, update: &PlayerUpdate) -> Result<(), GameError> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(role) = update.role {
            columns.push("role");
            values.push(Value::Text(role.as_str().to_string()));
        }
        if let Some(votes) = update.mafia_votes {
            columns.push("mafia_vote");
            values.push(Value::Integer(votes.into()));
        }
        if let Some(votes) = update.citizen_votes {
            columns.push("citizen_vote");
            values.push(Value::Integer(votes.into()));
        }
        if let Some(voted) = update.has_voted {
            columns.push("voted");
            values.push(Value::Integer(voted.into()));
        }
        if let Some(dead) = update.is_dead {
            columns.push("dead");
            values.push(Value::Integer(dead.into()));
        }
        if columns.is_empty() {
            return Ok(());
        }

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE players SET {} WHERE player_id = ?{}",
            assignments.join(", "),
            values.len() + 1
        );
        values.push(Value::Integer(id));

        self.tx
            .execute(&sql, params_from_iter(values))
            .map_err(store_failure)?;
        Ok(())
    }
}

impl PlayerStore for SqliteStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut dyn PlayerTx) -> Result<T, GameError>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(store_failure)?;
        let result = f(&mut SqliteTx { tx: &tx });
        match result {
            Ok(value) => {
                tx.commit().map_err(store_failure)?;
                Ok(value)
            }
            Err(e) => {
                // Dropping `tx` rolls back.
                log::debug!("Rolled back player transaction: {}", e);
                Err(e)
            }
        }
    }
}
