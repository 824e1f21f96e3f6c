//! Tournament lifecycle: Registration → Preselection → Pools → Finals → Completed.

use crate::error::{Result, TournamentError};
use crate::logic::generator::{self, Generated};
use crate::models::{BattlePhase, Tournament, TournamentPhase, TournamentStatus};
use serde::Serialize;

/// Read-only report of whether the tournament can advance, and what blocks it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PhaseValidation {
    pub ready: bool,
    pub current_phase: TournamentPhase,
    pub next_phase: Option<TournamentPhase>,
    pub blockers: Vec<String>,
}

pub fn phase_validation(tournament: &Tournament) -> PhaseValidation {
    let next_phase = tournament.phase.next();
    let mut blockers = Vec::new();
    if tournament.status.is_terminal() {
        blockers.push(format!("tournament is {}", tournament.status));
    }
    match next_phase {
        Some(target) => blockers.extend(preconditions(tournament, target)),
        None => blockers.push("tournament is already completed".to_string()),
    }
    PhaseValidation {
        ready: blockers.is_empty(),
        current_phase: tournament.phase,
        next_phase,
        blockers,
    }
}

/// Everything that prevents entering `target` from the current phase.
fn preconditions(tournament: &Tournament, target: TournamentPhase) -> Vec<String> {
    let mut blockers = Vec::new();
    if let Some(active) = tournament.active_battle() {
        blockers.push(format!("battle #{} is still active", active.sequence_order));
    }

    match target {
        TournamentPhase::Registration => {}
        TournamentPhase::Preselection => {
            if tournament.categories.is_empty() {
                blockers.push("tournament has no categories".to_string());
            }
            for c in &tournament.categories {
                if c.performers.len() < c.minimum_performers() {
                    blockers.push(format!(
                        "'{}' needs at least {} performers (has {})",
                        c.name,
                        c.minimum_performers(),
                        c.performers.len()
                    ));
                }
            }
        }
        TournamentPhase::Pools => {
            for c in &tournament.categories {
                for p in c.performers.iter().filter(|p| p.preselection_score.is_none()) {
                    blockers.push(format!("'{}' in '{}' has no preselection score", p.name, c.name));
                }
            }
        }
        TournamentPhase::Finals => {
            for c in &tournament.categories {
                for pool in &c.pools {
                    let open = c
                        .pool_battles(pool.id)
                        .filter(|b| b.phase == BattlePhase::Pool && !b.is_completed())
                        .count();
                    let tiebreak = c
                        .pool_battles(pool.id)
                        .any(|b| b.phase == BattlePhase::Tiebreak && !b.is_completed());
                    if open > 0 {
                        blockers.push(format!(
                            "{} in '{}' has {} battles not completed",
                            pool.name, c.name, open
                        ));
                    } else if tiebreak {
                        blockers.push(format!("{} in '{}' has a pending tiebreak", pool.name, c.name));
                    } else if pool.winner.is_none() {
                        blockers.push(format!("{} in '{}' has no winner", pool.name, c.name));
                    }
                }
            }
        }
        TournamentPhase::Completed => {
            for c in &tournament.categories {
                if c.bracket.as_ref().and_then(|b| b.champion).is_none() {
                    blockers.push(format!("final of '{}' is not decided", c.name));
                }
            }
        }
    }
    blockers
}

/// Move to the next phase, generating its pools and battles in every category.
///
/// Does not check the one-active-tournament rule; the engine does that when it
/// commits the Created → Active change.
pub fn advance_phase(tournament: &mut Tournament) -> Result<TournamentPhase> {
    let Some(target) = tournament.phase.next() else {
        return Err(TournamentError::invalid_transition(
            tournament.phase,
            tournament.phase,
            "tournament is already completed",
        ));
    };
    if tournament.status.is_terminal() {
        return Err(TournamentError::invalid_transition(
            tournament.phase,
            target,
            format!("tournament is {}", tournament.status),
        ));
    }
    let blockers = preconditions(tournament, target);
    if !blockers.is_empty() {
        return Err(TournamentError::Validation(blockers));
    }

    // Plan every category before touching any of them.
    let plans = tournament
        .categories
        .iter()
        .map(|c| generator::generate(c, target))
        .collect::<Result<Vec<Generated>>>()?;
    for (category, plan) in tournament.categories.iter_mut().zip(plans) {
        plan.apply(category);
    }

    let from = tournament.phase;
    tournament.phase = target;
    if tournament.status == TournamentStatus::Created {
        tournament.status = TournamentStatus::Active;
    }
    if target == TournamentPhase::Completed {
        tournament.status = TournamentStatus::Completed;
    }
    log::info!("tournament '{}' advanced from {} to {}", tournament.name, from, target);
    Ok(target)
}

/// Cancel a tournament that has not finished. Refused while a battle is running.
pub fn cancel(tournament: &mut Tournament) -> Result<()> {
    if tournament.status.is_terminal() {
        return Err(TournamentError::invalid_transition(
            tournament.status,
            TournamentStatus::Cancelled,
            format!("tournament is already {}", tournament.status),
        ));
    }
    if let Some(active) = tournament.active_battle() {
        return Err(TournamentError::invalid_transition(
            tournament.status,
            TournamentStatus::Cancelled,
            format!("battle #{} is still active", active.sequence_order),
        ));
    }
    tournament.status = TournamentStatus::Cancelled;
    log::info!("tournament '{}' cancelled", tournament.name);
    Ok(())
}
