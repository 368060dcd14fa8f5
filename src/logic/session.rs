//! Game session: drives setup, the night/day cycle and the terminal state.

use crate::logic::roster::{
    assign_roles_in, clear_roles_in, min_players_for_mafia, RosterManager,
};
use crate::logic::round::{
    log_resolution, log_vote, reset_in, resolve_in, vote_in, winner_in, RoundEngine,
};
use crate::models::{GameError, GameSnapshot, Phase, PlayerId, RoundKind, RoundOutcome, Winner};
use crate::store::PlayerStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One game of Mafia over a player store.
///
/// The phase and round number live here; everything about players lives in the store.
pub struct GameSession<S, R = StdRng> {
    store: S,
    rng: R,
    phase: Phase,
    round: u32,
}

impl<S: PlayerStore> GameSession<S, StdRng> {
    /// New session in Setup, shuffling roles with system entropy.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// New session in Setup with a fixed shuffle seed (reproducible role assignment).
    pub fn seeded(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }
}

impl<S: PlayerStore, R: Rng> GameSession<S, R> {
    pub fn with_rng(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            phase: Phase::Setup,
            round: 0,
        }
    }

    pub fn roster(&self) -> RosterManager<'_, S> {
        RosterManager::new(&self.store)
    }

    pub fn engine(&self) -> RoundEngine<'_, S> {
        RoundEngine::new(&self.store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round number; 0 before the game starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Register a player (Setup only).
    pub fn register_player(&self, id: PlayerId, username: &str) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::InvalidState);
        }
        self.roster().register(id, username)
    }

    /// Assign roles and open the first night (Setup only). Needs enough players for one mafia.
    ///
    /// The count, the role deal and the round reset share one transaction; the phase only
    /// moves once it has committed.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::InvalidState);
        }
        let rng = &mut self.rng;
        let (registered, mafia) = self.store.transaction(|tx| {
            let registered = tx.select_all()?.len();
            let required = min_players_for_mafia();
            if registered < required {
                return Err(GameError::NotEnoughPlayers {
                    required,
                    registered,
                });
            }
            let mafia = assign_roles_in(tx, rng)?;
            reset_in(tx, false)?;
            Ok((registered, mafia))
        })?;

        self.phase = Phase::Night;
        self.round = 1;
        log::info!("Game started with {} players, {} mafia", registered, mafia);
        Ok(())
    }

    /// Cast a vote in the current phase. At night only mafia votes are accepted.
    ///
    /// Returns `Ok(false)` for any rejected vote, including votes outside Night/Day.
    pub fn cast_vote(
        &self,
        voter_id: PlayerId,
        voter_username: &str,
        target_username: &str,
    ) -> Result<bool, GameError> {
        let Some(kind) = self.phase.round_kind() else {
            return Ok(false);
        };
        let accepted = self.store.transaction(|tx| {
            if kind == RoundKind::Mafia {
                let is_mafia = tx.select_by_id(voter_id)?.is_some_and(|p| p.is_mafia());
                if !is_mafia {
                    return Ok(false);
                }
            }
            vote_in(tx, kind, voter_username, voter_id, target_username)
        })?;
        log_vote(accepted, kind, voter_username, voter_id, target_username);
        Ok(accepted)
    }

    /// Resolve the current round, clear its votes, check for a winner and move on.
    ///
    /// Night is followed by Day; Day by the next Night. A winner ends the game. The
    /// elimination, the reset and the win check commit together or not at all.
    pub fn resolve_round(&mut self) -> Result<RoundOutcome, GameError> {
        let kind = self.phase.round_kind().ok_or(GameError::InvalidState)?;

        let (eliminated, winner) = self.store.transaction(|tx| {
            let eliminated = resolve_in(tx, kind)?;
            reset_in(tx, false)?;
            Ok((eliminated, winner_in(tx)?))
        })?;
        log_resolution(kind, eliminated.as_deref());

        let outcome = RoundOutcome {
            kind,
            round: self.round,
            eliminated,
            winner,
        };

        self.phase = match (winner, kind) {
            (Some(w), _) => {
                log::info!("Game over after round {}: {} win", self.round, w);
                Phase::Finished(w)
            }
            (None, RoundKind::Mafia) => Phase::Day,
            (None, RoundKind::Citizen) => {
                self.round += 1;
                Phase::Night
            }
        };
        Ok(outcome)
    }

    pub fn check_winner(&self) -> Result<Option<Winner>, GameError> {
        self.engine().check_winner()
    }

    /// Clear votes (and deaths, with `include_deaths`) without touching the phase.
    pub fn reset_round(&self, include_deaths: bool) -> Result<(), GameError> {
        self.engine().reset_round(include_deaths)
    }

    /// Start over with the same roster: clear roles, votes and deaths, back to Setup.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.store.transaction(|tx| {
            reset_in(tx, true)?;
            clear_roles_in(tx)
        })?;
        self.phase = Phase::Setup;
        self.round = 0;
        log::info!("Session restarted");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        Ok(GameSnapshot {
            phase: self.phase,
            round: self.round,
            registered: self.roster().count()?,
            alive: self.roster().list_alive_usernames()?,
        })
    }
}
