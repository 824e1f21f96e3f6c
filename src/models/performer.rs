//! Performer and PoolRecord data structures.

use crate::models::battle::BattleResult;
use crate::models::score::Score;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a performer (a solo dancer or a duo).
pub type PerformerId = Uuid;

/// Accumulated pool results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl PoolRecord {
    pub const WIN_POINTS: u32 = 3;
    pub const DRAW_POINTS: u32 = 1;
    pub const LOSS_POINTS: u32 = 0;

    pub fn points(&self) -> u32 {
        self.wins * Self::WIN_POINTS + self.draws * Self::DRAW_POINTS + self.losses * Self::LOSS_POINTS
    }

    /// Count one completed battle from `performer`'s side.
    pub fn add(&mut self, performer: PerformerId, result: &BattleResult) {
        if result.winner == Some(performer) {
            self.wins += 1;
        } else if result.draw {
            self.draws += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// A performer registered in one category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Performer {
    pub id: PerformerId,
    pub name: String,
    /// 0-based position in the category's registration list; final tie-break everywhere.
    pub registration_order: u32,
    pub record: PoolRecord,
    /// Set when the performer's preselection battle is judged.
    pub preselection_score: Option<Score>,
}

impl Performer {
    pub fn new(name: impl Into<String>, registration_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            registration_order,
            record: PoolRecord::default(),
            preselection_score: None,
        }
    }
}
