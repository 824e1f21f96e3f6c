//! In-process registry of tournaments.
//!
//! Each tournament sits behind its own mutex, so requests for one tournament are
//! serialized while different tournaments proceed independently. Every mutation runs on
//! a draft copy and is committed only when it succeeds; the one-active-tournament and
//! one-active-battle rules are checked under a narrow global lock at commit time.
//! Lock order is always tournament, then global slots. The id indexes are never held
//! while waiting for a tournament lock.

use crate::error::{Result, TournamentError};
use crate::logic::{self, PhaseGenerator, PhaseValidation, Standings};
use crate::models::{
    Battle, BattleId, Category, CategoryId, NewCategory, Outcome, Performer, PerformerId, PoolId,
    Tournament, TournamentId, TournamentStatus,
};
use crate::roster;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Shared = Arc<Mutex<Tournament>>;

/// Holders of the system-wide singleton states.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct ActiveSlots {
    tournament: Option<TournamentId>,
    battle: Option<BattleId>,
}

// Drafts are only swapped in after success, so a poisoned lock still guards consistent state.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct Engine {
    tournaments: RwLock<HashMap<TournamentId, Shared>>,
    battles: RwLock<HashMap<BattleId, TournamentId>>,
    pools: RwLock<HashMap<PoolId, TournamentId>>,
    active: Mutex<ActiveSlots>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: TournamentId) -> Result<Shared> {
        read(&self.tournaments)
            .get(&id)
            .cloned()
            .ok_or(TournamentError::not_found("tournament", id))
    }

    fn owner_of_battle(&self, id: BattleId) -> Result<TournamentId> {
        read(&self.battles)
            .get(&id)
            .copied()
            .ok_or(TournamentError::not_found("battle", id))
    }

    fn owner_of_pool(&self, id: PoolId) -> Result<TournamentId> {
        read(&self.pools)
            .get(&id)
            .copied()
            .ok_or(TournamentError::not_found("pool", id))
    }

    /// Run `f` on a draft of the tournament; commit the draft only if `f` succeeds and
    /// the global slots accept the resulting state. Returns `f`'s output and a snapshot.
    fn mutate<R>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<R>,
    ) -> Result<(R, Tournament)> {
        let handle = self.handle(id)?;
        let mut current = lock(&*handle);
        let mut draft = current.clone();
        let out = f(&mut draft)?;
        self.claim_slots(&current, &draft)?;
        self.index(&draft);
        *current = draft;
        Ok((out, current.clone()))
    }

    /// Check and record changes to the active tournament/battle atomically.
    fn claim_slots(&self, before: &Tournament, after: &Tournament) -> Result<()> {
        let mut slots = lock(&self.active);
        let mut next = *slots;

        let was_active = before.status == TournamentStatus::Active;
        let is_active = after.status == TournamentStatus::Active;
        if !was_active && is_active {
            match next.tournament {
                Some(other) if other != after.id => {
                    log::warn!("tournament {} cannot start: {} is active", after.id, other);
                    return Err(TournamentError::Conflict(format!(
                        "tournament {} is already active",
                        other
                    )));
                }
                _ => next.tournament = Some(after.id),
            }
        } else if was_active && !is_active && next.tournament == Some(after.id) {
            next.tournament = None;
        }

        let old_battle = before.active_battle().map(|b| b.id);
        let new_battle = after.active_battle().map(|b| b.id);
        if old_battle != new_battle {
            if old_battle.is_some() && next.battle == old_battle {
                next.battle = None;
            }
            if let Some(battle) = new_battle {
                match next.battle {
                    Some(other) if other != battle => {
                        log::warn!("battle {} cannot start: {} is active", battle, other);
                        return Err(TournamentError::Conflict(format!(
                            "battle {} is already active",
                            other
                        )));
                    }
                    _ => next.battle = Some(battle),
                }
            }
        }

        *slots = next;
        Ok(())
    }

    fn index(&self, tournament: &Tournament) {
        {
            let mut battles = write(&self.battles);
            for b in tournament.battles() {
                battles.entry(b.id).or_insert(tournament.id);
            }
        }
        let mut pools = write(&self.pools);
        for c in &tournament.categories {
            for p in &c.pools {
                pools.entry(p.id).or_insert(tournament.id);
            }
        }
    }

    pub fn create_tournament(&self, name: impl Into<String>, date: NaiveDate) -> Tournament {
        let tournament = Tournament::new(name, date);
        let snapshot = tournament.clone();
        write(&self.tournaments).insert(tournament.id, Arc::new(Mutex::new(tournament)));
        log::info!("tournament '{}' created ({})", snapshot.name, snapshot.id);
        snapshot
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament> {
        let handle = self.handle(id)?;
        let snapshot = lock(&*handle).clone();
        Ok(snapshot)
    }

    /// All tournaments, oldest first.
    pub fn tournaments(&self) -> Vec<Tournament> {
        let handles: Vec<Shared> = read(&self.tournaments).values().cloned().collect();
        let mut all: Vec<Tournament> = handles.iter().map(|h| lock(&**h).clone()).collect();
        all.sort_by_key(|t| t.created_at);
        all
    }

    pub fn active_tournament(&self) -> Option<TournamentId> {
        lock(&self.active).tournament
    }

    pub fn active_battle(&self) -> Option<BattleId> {
        lock(&self.active).battle
    }

    pub fn add_category(&self, tournament_id: TournamentId, input: NewCategory) -> Result<Category> {
        let (id, tournament) = self.mutate(tournament_id, |t| t.add_category(input))?;
        tournament
            .category(id)
            .cloned()
            .ok_or(TournamentError::not_found("category", id))
    }

    pub fn register_performer(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Performer> {
        let (id, tournament) =
            self.mutate(tournament_id, |t| t.register_performer(category_id, name))?;
        tournament
            .category(category_id)
            .and_then(|c| c.performer(id))
            .cloned()
            .ok_or(TournamentError::not_found("performer", id))
    }

    /// Register performers from a `category,name` CSV; all rows or none.
    pub fn import_roster<R: Read>(&self, tournament_id: TournamentId, reader: R) -> Result<Vec<PerformerId>> {
        let entries = roster::parse_roster(reader)?;
        let (ids, _) = self.mutate(tournament_id, |t| roster::apply_roster(t, &entries))?;
        Ok(ids)
    }

    pub fn phase_validation(&self, tournament_id: TournamentId) -> Result<PhaseValidation> {
        let handle = self.handle(tournament_id)?;
        let tournament = lock(&*handle);
        Ok(logic::phase_validation(&tournament))
    }

    pub fn advance_tournament_phase(&self, tournament_id: TournamentId) -> Result<Tournament> {
        let (_, tournament) = self.mutate(tournament_id, logic::advance_phase)?;
        Ok(tournament)
    }

    pub fn cancel_tournament(&self, tournament_id: TournamentId) -> Result<Tournament> {
        let (_, tournament) = self.mutate(tournament_id, logic::cancel)?;
        Ok(tournament)
    }

    pub fn battle(&self, battle_id: BattleId) -> Result<Battle> {
        let handle = self.handle(self.owner_of_battle(battle_id)?)?;
        let tournament = lock(&*handle);
        tournament
            .battle(battle_id)
            .cloned()
            .ok_or(TournamentError::not_found("battle", battle_id))
    }

    pub fn start_battle(&self, battle_id: BattleId) -> Result<Battle> {
        let owner = self.owner_of_battle(battle_id)?;
        let (_, tournament) = self.mutate(owner, |t| logic::start_battle(t, battle_id))?;
        tournament
            .battle(battle_id)
            .cloned()
            .ok_or(TournamentError::not_found("battle", battle_id))
    }

    pub fn record_battle_outcome(&self, battle_id: BattleId, outcome: &Outcome) -> Result<Battle> {
        let owner = self.owner_of_battle(battle_id)?;
        let (_, tournament) = self.mutate(owner, |t| {
            logic::record_outcome(t, battle_id, outcome, &PhaseGenerator)
        })?;
        tournament
            .battle(battle_id)
            .cloned()
            .ok_or(TournamentError::not_found("battle", battle_id))
    }

    pub fn standings(&self, pool_id: PoolId) -> Result<Standings> {
        let handle = self.handle(self.owner_of_pool(pool_id)?)?;
        let tournament = lock(&*handle);
        let (category, pool) = tournament
            .pool(pool_id)
            .ok_or(TournamentError::not_found("pool", pool_id))?;
        Ok(logic::rank(category, pool))
    }
}
