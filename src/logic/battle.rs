//! Battle lifecycle: Pending → Active → Completed, outcome recording and standings updates.

use crate::error::{Result, TournamentError};
use crate::logic::generator;
use crate::models::{
    BattleId, BattlePhase, BattleStatus, Category, CategoryId, Outcome, PoolId, Tournament,
    TournamentStatus,
};
use chrono::Utc;

/// Emitted when a battle reaches Completed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BattleCompleted {
    pub category_id: CategoryId,
    pub battle_id: BattleId,
    pub phase: BattlePhase,
    pub pool_id: Option<PoolId>,
}

/// Receives completion events from [`record_outcome`]. An error leaves the category unchanged.
pub trait CompletionObserver {
    fn battle_completed(&self, category: &mut Category, event: &BattleCompleted) -> Result<()>;
}

/// Settles pools and generates later bracket rounds as battles complete.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseGenerator;

impl CompletionObserver for PhaseGenerator {
    fn battle_completed(&self, category: &mut Category, event: &BattleCompleted) -> Result<()> {
        let generated = generator::on_battle_completed(category, event)?;
        if !generated.is_empty() {
            generated.apply(category);
        }
        Ok(())
    }
}

/// Start a pending battle. Only one battle of the tournament may be active; the
/// engine additionally enforces this across tournaments.
pub fn start_battle(tournament: &mut Tournament, battle_id: BattleId) -> Result<()> {
    let battle = tournament
        .battle(battle_id)
        .ok_or(TournamentError::not_found("battle", battle_id))?;
    if battle.status != BattleStatus::Pending {
        return Err(TournamentError::invalid_transition(
            battle.status,
            BattleStatus::Active,
            "only pending battles can be started",
        ));
    }
    if tournament.status != TournamentStatus::Active {
        return Err(TournamentError::invalid_transition(
            battle.status,
            BattleStatus::Active,
            format!("tournament is {}", tournament.status),
        ));
    }
    if battle.phase.tournament_phase() != tournament.phase {
        return Err(TournamentError::invalid_transition(
            battle.status,
            BattleStatus::Active,
            format!(
                "battle belongs to {} but tournament is in {}",
                battle.phase.tournament_phase(),
                tournament.phase
            ),
        ));
    }
    if let Some(active) = tournament.active_battle() {
        return Err(TournamentError::Conflict(format!(
            "battle {} is already active",
            active.id
        )));
    }

    let battle = tournament
        .category_of_battle_mut(battle_id)
        .and_then(|c| c.battle_mut(battle_id))
        .ok_or(TournamentError::not_found("battle", battle_id))?;
    battle.status = BattleStatus::Active;
    battle.started_at = Some(Utc::now());
    log::info!("battle {} (#{}) started", battle.id, battle.sequence_order);
    Ok(())
}

/// Judge an active battle: validate the outcome against its type, complete it, update
/// performer records, then notify the observer. Works on a copy of the category that
/// replaces the stored one only when the observer accepts the event.
pub fn record_outcome(
    tournament: &mut Tournament,
    battle_id: BattleId,
    outcome: &Outcome,
    observer: &dyn CompletionObserver,
) -> Result<BattleCompleted> {
    let category = tournament
        .category_of_battle_mut(battle_id)
        .ok_or(TournamentError::not_found("battle", battle_id))?;
    let battle = category
        .battle(battle_id)
        .ok_or(TournamentError::not_found("battle", battle_id))?;
    if battle.status != BattleStatus::Active {
        return Err(TournamentError::invalid_transition(
            battle.status,
            BattleStatus::Completed,
            "only active battles can be judged",
        ));
    }
    let result = outcome.validate(battle).map_err(TournamentError::Validation)?;
    let performers = battle.performers.clone();
    let event = BattleCompleted {
        category_id: category.id,
        battle_id,
        phase: battle.phase,
        pool_id: battle.pool_id,
    };

    let mut draft = category.clone();
    match event.phase {
        BattlePhase::Pool => {
            for p in performers {
                draft
                    .performer_mut(p)
                    .ok_or(TournamentError::not_found("performer", p))?
                    .record
                    .add(p, &result);
            }
        }
        BattlePhase::Preselection => {
            for s in &result.scores {
                draft
                    .performer_mut(s.performer)
                    .ok_or(TournamentError::not_found("performer", s.performer))?
                    .preselection_score = Some(s.score);
            }
        }
        BattlePhase::Tiebreak | BattlePhase::Finals => {}
    }

    let battle = draft
        .battle_mut(battle_id)
        .ok_or(TournamentError::not_found("battle", battle_id))?;
    battle.status = BattleStatus::Completed;
    battle.result = Some(result);
    battle.completed_at = Some(Utc::now());
    let sequence = battle.sequence_order;

    observer.battle_completed(&mut draft, &event)?;
    *category = draft;
    log::info!("battle {} (#{}) completed", battle_id, sequence);
    Ok(event)
}
