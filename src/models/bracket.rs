//! Single-elimination bracket for the finals.

use crate::models::battle::BattleId;
use crate::models::performer::PerformerId;
use serde::{Deserialize, Serialize};

/// One position in a bracket round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BracketSlot {
    /// Performer advances without battling (first round only).
    Bye { performer: PerformerId },
    Battle { battle_id: BattleId },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub index: u32,
    /// In bracket order: winners of slots 2k and 2k+1 meet in the next round.
    pub slots: Vec<BracketSlot>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Finalists, best seed first.
    pub seeds: Vec<PerformerId>,
    /// Rounds generated so far; later rounds appear as earlier ones finish.
    pub rounds: Vec<BracketRound>,
    pub champion: Option<PerformerId>,
}

impl Bracket {
    pub fn current_round(&self) -> Option<&BracketRound> {
        self.rounds.last()
    }

    /// Round that contains the given battle, if any.
    pub fn round_of(&self, battle_id: BattleId) -> Option<&BracketRound> {
        self.rounds.iter().find(|r| {
            r.slots
                .iter()
                .any(|s| matches!(s, BracketSlot::Battle { battle_id: b } if *b == battle_id))
        })
    }
}
