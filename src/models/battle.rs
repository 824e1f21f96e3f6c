//! Battle, its status/phase enums, and the outcome variants a judge can submit.

use crate::models::category::CategoryId;
use crate::models::performer::PerformerId;
use crate::models::pool::PoolId;
use crate::models::score::Score;
use crate::models::tournament::TournamentPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a battle.
pub type BattleId = Uuid;

/// Which part of the tournament this battle belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    Preselection,
    Pool,
    Tiebreak,
    Finals,
}

impl BattlePhase {
    /// Tournament phase during which battles of this kind may run.
    pub fn tournament_phase(self) -> TournamentPhase {
        match self {
            BattlePhase::Preselection => TournamentPhase::Preselection,
            BattlePhase::Pool | BattlePhase::Tiebreak => TournamentPhase::Pools,
            BattlePhase::Finals => TournamentPhase::Finals,
        }
    }
}

/// Battle lifecycle: Pending → Active → Completed.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BattleStatus::Pending => "pending",
            BattleStatus::Active => "active",
            BattleStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// How a battle is judged; decides which [`Outcome`] variant it accepts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    Scored,
    WinDrawLoss,
    WinLoss,
    Tiebreak,
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeType::Scored => "scored",
            OutcomeType::WinDrawLoss => "win_draw_loss",
            OutcomeType::WinLoss => "win_loss",
            OutcomeType::Tiebreak => "tiebreak",
        };
        f.write_str(s)
    }
}

/// One judge score as submitted (validated into a [`Score`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub performer: PerformerId,
    pub score: f64,
}

/// Outcome submitted by a caller. Must match the battle's declared [`OutcomeType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Scored {
        scores: Vec<ScoreEntry>,
    },
    WinDrawLoss {
        #[serde(default)]
        winner: Option<PerformerId>,
        #[serde(default)]
        draw: bool,
    },
    WinLoss {
        #[serde(default)]
        winner: Option<PerformerId>,
        #[serde(default)]
        draw: bool,
    },
    Tiebreak {
        #[serde(default)]
        winner: Option<PerformerId>,
    },
}

impl Outcome {
    pub fn scored(scores: impl IntoIterator<Item = (PerformerId, f64)>) -> Self {
        Outcome::Scored {
            scores: scores
                .into_iter()
                .map(|(performer, score)| ScoreEntry { performer, score })
                .collect(),
        }
    }

    pub fn win(winner: PerformerId) -> Self {
        Outcome::WinDrawLoss {
            winner: Some(winner),
            draw: false,
        }
    }

    pub fn draw() -> Self {
        Outcome::WinDrawLoss {
            winner: None,
            draw: true,
        }
    }

    pub fn knockout(winner: PerformerId) -> Self {
        Outcome::WinLoss {
            winner: Some(winner),
            draw: false,
        }
    }

    pub fn tiebreak(winner: PerformerId) -> Self {
        Outcome::Tiebreak {
            winner: Some(winner),
        }
    }

    pub fn outcome_type(&self) -> OutcomeType {
        match self {
            Outcome::Scored { .. } => OutcomeType::Scored,
            Outcome::WinDrawLoss { .. } => OutcomeType::WinDrawLoss,
            Outcome::WinLoss { .. } => OutcomeType::WinLoss,
            Outcome::Tiebreak { .. } => OutcomeType::Tiebreak,
        }
    }

    /// Check the outcome against the battle and turn it into a stored result.
    /// Returns every problem found, not just the first.
    pub fn validate(&self, battle: &Battle) -> Result<BattleResult, Vec<String>> {
        if self.outcome_type() != battle.outcome_type {
            return Err(vec![format!(
                "outcome type {} does not match battle outcome type {}",
                self.outcome_type(),
                battle.outcome_type
            )]);
        }
        match self {
            Outcome::Scored { scores } => validate_scores(battle, scores),
            Outcome::WinDrawLoss { winner, draw } => match (winner, draw) {
                (Some(w), false) => decided(battle, *w),
                (None, true) => Ok(BattleResult {
                    winner: None,
                    draw: true,
                    scores: Vec::new(),
                }),
                (Some(_), true) => Err(vec!["winner and draw are mutually exclusive".to_string()]),
                (None, false) => Err(vec!["either a winner or a draw is required".to_string()]),
            },
            Outcome::WinLoss { winner, draw } => {
                if *draw {
                    return Err(vec!["draws are not allowed in win/loss battles".to_string()]);
                }
                match winner {
                    Some(w) => decided(battle, *w),
                    None => Err(vec!["a winner is required".to_string()]),
                }
            }
            Outcome::Tiebreak { winner } => match winner {
                Some(w) => decided(battle, *w),
                None => Err(vec!["a tiebreak winner is required".to_string()]),
            },
        }
    }
}

fn decided(battle: &Battle, winner: PerformerId) -> Result<BattleResult, Vec<String>> {
    if !battle.involves(winner) {
        return Err(vec![format!("winner {} is not in this battle", winner)]);
    }
    Ok(BattleResult {
        winner: Some(winner),
        draw: false,
        scores: Vec::new(),
    })
}

fn validate_scores(battle: &Battle, entries: &[ScoreEntry]) -> Result<BattleResult, Vec<String>> {
    let mut errors = Vec::new();
    let mut scores: Vec<PerformerScore> = Vec::with_capacity(entries.len());

    for entry in entries {
        if !battle.involves(entry.performer) {
            errors.push(format!("performer {} is not in this battle", entry.performer));
            continue;
        }
        if scores.iter().any(|s| s.performer == entry.performer) {
            errors.push(format!("performer {} scored more than once", entry.performer));
            continue;
        }
        match Score::new(entry.score) {
            Ok(score) => scores.push(PerformerScore {
                performer: entry.performer,
                score,
            }),
            Err(e) => errors.push(format!("performer {}: {}", entry.performer, e)),
        }
    }
    for &p in &battle.performers {
        if !entries.iter().any(|e| e.performer == p) {
            errors.push(format!("performer {} has no score", p));
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    scores.sort_by_key(|s| battle.performers.iter().position(|&p| p == s.performer));

    // Scored pool battles still produce a win/draw/loss for the standings.
    let (winner, draw) = if battle.phase == BattlePhase::Pool {
        let top = scores.iter().map(|s| s.score).max();
        let leaders: Vec<_> = scores.iter().filter(|s| Some(s.score) == top).collect();
        match leaders.as_slice() {
            [only] => (Some(only.performer), false),
            _ => (None, true),
        }
    } else {
        (None, false)
    };

    Ok(BattleResult {
        winner,
        draw,
        scores,
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PerformerScore {
    pub performer: PerformerId,
    pub score: Score,
}

/// Validated, stored result of a completed battle.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Option<PerformerId>,
    pub draw: bool,
    /// Empty unless the battle was scored.
    pub scores: Vec<PerformerScore>,
}

impl BattleResult {
    pub fn score_of(&self, performer: PerformerId) -> Option<Score> {
        self.scores
            .iter()
            .find(|s| s.performer == performer)
            .map(|s| s.score)
    }
}

/// A single battle between two or more performers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    pub category_id: CategoryId,
    pub phase: BattlePhase,
    pub status: BattleStatus,
    pub outcome_type: OutcomeType,
    pub performers: Vec<PerformerId>,
    pub pool_id: Option<PoolId>,
    /// 0-based bracket round (finals only).
    pub bracket_round: Option<u32>,
    /// Strictly increasing within a category.
    pub sequence_order: u32,
    /// None until completed.
    pub result: Option<BattleResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Battle {
    /// New pending battle. The id is derived from category and sequence so that
    /// regenerating the same phase yields identical battles.
    pub fn new(
        category_id: CategoryId,
        phase: BattlePhase,
        outcome_type: OutcomeType,
        performers: Vec<PerformerId>,
        sequence_order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v5(&category_id, format!("battle/{sequence_order}").as_bytes()),
            category_id,
            phase,
            status: BattleStatus::Pending,
            outcome_type,
            performers,
            pool_id: None,
            bracket_round: None,
            sequence_order,
            result: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn in_pool(mut self, pool_id: PoolId) -> Self {
        self.pool_id = Some(pool_id);
        self
    }

    pub fn in_round(mut self, round: u32) -> Self {
        self.bracket_round = Some(round);
        self
    }

    pub fn involves(&self, performer: PerformerId) -> bool {
        self.performers.contains(&performer)
    }

    pub fn is_completed(&self) -> bool {
        self.status == BattleStatus::Completed
    }

    pub fn winner(&self) -> Option<PerformerId> {
        self.result.as_ref().and_then(|r| r.winner)
    }
}
