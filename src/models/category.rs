//! Category: one competition format inside a tournament, owning its performers, pools and battles.

use crate::error::{Result, TournamentError};
use crate::models::battle::{Battle, BattleId, OutcomeType};
use crate::models::bracket::Bracket;
use crate::models::performer::{Performer, PerformerId};
use crate::models::pool::{Pool, PoolId};
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

/// Solo or duo battles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Format {
    #[default]
    #[serde(rename = "1v1")]
    OneVOne,
    #[serde(rename = "2v2")]
    TwoVTwo,
}

/// Parameters for a new category (admin input).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub format: Format,
    /// How many performers advance from preselection to pools.
    pub quota: usize,
    /// Number of pools.
    pub groups_ideal: usize,
    /// `scored` or `win_draw_loss`.
    #[serde(default = "default_pool_outcome")]
    pub pool_outcome: OutcomeType,
}

fn default_pool_outcome() -> OutcomeType {
    OutcomeType::WinDrawLoss
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub format: Format,
    pub quota: usize,
    pub groups_ideal: usize,
    pub pool_outcome: OutcomeType,
    /// Registration order.
    pub performers: Vec<Performer>,
    pub pools: Vec<Pool>,
    /// Sorted by `sequence_order`.
    pub battles: Vec<Battle>,
    pub bracket: Option<Bracket>,
}

impl Category {
    pub fn new(tournament_id: TournamentId, input: NewCategory) -> Result<Self> {
        let name = input.name.trim();
        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("category name must not be empty".to_string());
        }
        // finals need two pool winners to have a battle at all
        if input.groups_ideal < 2 {
            errors.push("groups_ideal must be at least 2".to_string());
        }
        if input.quota < 2 * input.groups_ideal {
            errors.push(format!(
                "quota {} cannot fill {} pools with at least 2 performers each",
                input.quota, input.groups_ideal
            ));
        }
        if !matches!(input.pool_outcome, OutcomeType::Scored | OutcomeType::WinDrawLoss) {
            errors.push(format!("pool battles cannot be judged as {}", input.pool_outcome));
        }
        if !errors.is_empty() {
            return Err(TournamentError::Validation(errors));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.to_string(),
            format: input.format,
            quota: input.quota,
            groups_ideal: input.groups_ideal,
            pool_outcome: input.pool_outcome,
            performers: Vec::new(),
            pools: Vec::new(),
            battles: Vec::new(),
            bracket: None,
        })
    }

    /// Fewest performers that still leave one elimination after filling the pools.
    pub fn minimum_performers(&self) -> usize {
        2 * self.groups_ideal + 1
    }

    /// Register a performer. Names are unique per category (case-insensitive).
    pub fn register(&mut self, name: &str) -> Result<PerformerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::validation("performer name must not be empty"));
        }
        if self.performers.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::validation(format!(
                "performer '{}' is already registered in '{}'",
                name, self.name
            )));
        }
        let performer = Performer::new(name, self.performers.len() as u32);
        let id = performer.id;
        self.performers.push(performer);
        Ok(id)
    }

    pub fn performer(&self, id: PerformerId) -> Option<&Performer> {
        self.performers.iter().find(|p| p.id == id)
    }

    pub fn performer_mut(&mut self, id: PerformerId) -> Option<&mut Performer> {
        self.performers.iter_mut().find(|p| p.id == id)
    }

    pub fn pool(&self, id: PoolId) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id == id)
    }

    pub fn battle(&self, id: BattleId) -> Option<&Battle> {
        self.battles.iter().find(|b| b.id == id)
    }

    pub fn battle_mut(&mut self, id: BattleId) -> Option<&mut Battle> {
        self.battles.iter_mut().find(|b| b.id == id)
    }

    /// Battles of one pool (round robin and tiebreaks).
    pub fn pool_battles(&self, pool_id: PoolId) -> impl Iterator<Item = &Battle> {
        self.battles.iter().filter(move |b| b.pool_id == Some(pool_id))
    }

    /// Next free sequence number in this category.
    pub fn next_sequence_order(&self) -> u32 {
        self.battles
            .iter()
            .map(|b| b.sequence_order + 1)
            .max()
            .unwrap_or(1)
    }

    /// Registration order of a performer (unknown performers sort last).
    pub fn registration_order(&self, id: PerformerId) -> u32 {
        self.performer(id).map_or(u32::MAX, |p| p.registration_order)
    }
}
