//! Round engine: vote casting, night/day resolution, win check and round reset.

use crate::models::{GameError, Player, PlayerId, PlayerUpdate, Role, RoundKind, Winner};
use crate::store::{PlayerStore, PlayerTx};

/// Records votes and turns a round's tallies into zero or one elimination.
pub struct RoundEngine<'s, S> {
    store: &'s S,
}

fn tally(player: &Player, kind: RoundKind) -> u32 {
    match kind {
        RoundKind::Mafia => player.mafia_votes,
        RoundKind::Citizen => player.citizen_votes,
    }
}

fn add_vote(player: &Player, kind: RoundKind) -> PlayerUpdate {
    let mut update = PlayerUpdate::default();
    match kind {
        RoundKind::Mafia => update.mafia_votes = Some(player.mafia_votes + 1),
        RoundKind::Citizen => update.citizen_votes = Some(player.citizen_votes + 1),
    }
    update
}

/// Players sharing the highest `kind` tally, ascending id. Empty roster gives an empty list.
fn leaders(players: &[Player], kind: RoundKind) -> Vec<&Player> {
    let Some(max_votes) = players.iter().map(|p| tally(p, kind)).max() else {
        return Vec::new();
    };
    players.iter().filter(|p| tally(p, kind) == max_votes).collect()
}

/// Kill the first leader if the number of leaders equals `required`.
fn eliminate_if(
    tx: &mut dyn PlayerTx,
    kind: RoundKind,
    required: usize,
) -> Result<Option<String>, GameError> {
    let players = tx.select_all()?;
    let tied = leaders(&players, kind);
    if tied.len() != required {
        return Ok(None);
    }
    let Some(victim) = tied.first() else {
        return Ok(None);
    };
    tx.update_fields(victim.id, &PlayerUpdate::killed())?;
    Ok(Some(victim.username.clone()))
}

/// Voter checks plus the tally update, inside an open transaction.
pub(crate) fn vote_in(
    tx: &mut dyn PlayerTx,
    kind: RoundKind,
    voter_username: &str,
    voter_id: PlayerId,
    target_username: &str,
) -> Result<bool, GameError> {
    let voter = match tx.select_by_id(voter_id)? {
        Some(v) if v.is_alive() && !v.has_voted && v.username == voter_username => v,
        _ => return Ok(false),
    };
    for target in tx.select_where(&|p: &Player| p.username == target_username)? {
        tx.update_fields(target.id, &add_vote(&target, kind))?;
    }
    tx.update_fields(voter.id, &PlayerUpdate::voted())?;
    Ok(true)
}

pub(crate) fn log_vote(
    accepted: bool,
    kind: RoundKind,
    voter_username: &str,
    voter_id: PlayerId,
    target_username: &str,
) {
    if accepted {
        log::debug!("{:?} vote by {} against {}", kind, voter_username, target_username);
    } else {
        log::debug!("Rejected {:?} vote by {} ({})", kind, voter_username, voter_id);
    }
}

/// Night or day resolution inside an open transaction.
pub(crate) fn resolve_in(
    tx: &mut dyn PlayerTx,
    kind: RoundKind,
) -> Result<Option<String>, GameError> {
    match kind {
        RoundKind::Mafia => {
            let alive_mafia = tx
                .select_where(&|p: &Player| p.is_alive() && p.is_mafia())?
                .len();
            eliminate_if(tx, RoundKind::Mafia, alive_mafia)
        }
        RoundKind::Citizen => eliminate_if(tx, RoundKind::Citizen, 1),
    }
}

pub(crate) fn log_resolution(kind: RoundKind, killed: Option<&str>) {
    match (kind, killed) {
        (RoundKind::Mafia, Some(name)) => log::info!("Mafia killed {}", name),
        (RoundKind::Mafia, None) => log::info!("Mafia did not agree on a victim"),
        (RoundKind::Citizen, Some(name)) => log::info!("Citizens voted out {}", name),
        (RoundKind::Citizen, None) => log::info!("Citizens vote ended in a tie"),
    }
}

/// Win check inside an open transaction. Unassigned players count for neither side.
pub(crate) fn winner_in(tx: &mut dyn PlayerTx) -> Result<Option<Winner>, GameError> {
    let alive = tx.select_where(&|p: &Player| p.is_alive())?;
    let alive_mafia = alive.iter().filter(|p| p.role == Role::Mafia).count();
    let alive_citizens = alive.iter().filter(|p| p.role == Role::Citizen).count();

    if alive_mafia > alive_citizens {
        Ok(Some(Winner::Mafia))
    } else if alive_mafia == 0 {
        Ok(Some(Winner::Citizens))
    } else {
        Ok(None)
    }
}

/// Round reset inside an open transaction.
pub(crate) fn reset_in(tx: &mut dyn PlayerTx, include_deaths: bool) -> Result<(), GameError> {
    let update = PlayerUpdate::round_reset(include_deaths);
    for player in tx.select_all()? {
        tx.update_fields(player.id, &update)?;
    }
    Ok(())
}

impl<'s, S: PlayerStore> RoundEngine<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Cast one vote against `target_username`.
    ///
    /// Returns `Ok(false)` when the voter is unknown, dead, has already voted this round or
    /// their stored username differs from `voter_username`. The target is not validated: a
    /// vote for a dead or unknown username is accepted and uses up the voter's vote.
    /// Every player carrying `target_username` receives the vote.
    pub fn cast_vote(
        &self,
        kind: RoundKind,
        voter_username: &str,
        voter_id: PlayerId,
        target_username: &str,
    ) -> Result<bool, GameError> {
        let accepted = self
            .store
            .transaction(|tx| vote_in(tx, kind, voter_username, voter_id, target_username))?;
        log_vote(accepted, kind, voter_username, voter_id, target_username);
        Ok(accepted)
    }

    /// Night resolution: kill the top target if the number of players tied at the highest
    /// mafia tally equals the number of living mafia.
    ///
    /// When several players are tied and that count still matches, the one with the lowest id
    /// dies. Before any mafia vote every player is tied at zero, so a roster made only of
    /// living mafia would lose its first member.
    pub fn resolve_mafia_round(&self) -> Result<Option<String>, GameError> {
        self.resolve(RoundKind::Mafia)
    }

    /// Day resolution: eliminate the top target only if exactly one player holds the highest
    /// citizen tally.
    pub fn resolve_citizen_round(&self) -> Result<Option<String>, GameError> {
        self.resolve(RoundKind::Citizen)
    }

    /// Resolve the round of the given kind.
    pub fn resolve(&self, kind: RoundKind) -> Result<Option<String>, GameError> {
        let killed = self.store.transaction(|tx| resolve_in(tx, kind))?;
        log_resolution(kind, killed.as_deref());
        Ok(killed)
    }

    /// Mafia win once they outnumber the living citizens; citizens win once no mafia is alive.
    /// The mafia check runs first.
    pub fn check_winner(&self) -> Result<Option<Winner>, GameError> {
        self.store.transaction(|tx| winner_in(tx))
    }

    /// Zero every tally and voted flag. With `include_deaths`, also bring everyone back to life.
    pub fn reset_round(&self, include_deaths: bool) -> Result<(), GameError> {
        self.store.transaction(|tx| reset_in(tx, include_deaths))?;
        log::debug!("Reset round state (include_deaths = {})", include_deaths);
        Ok(())
    }
}
