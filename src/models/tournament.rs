//! Tournament aggregate, TournamentStatus and TournamentPhase.

use crate::error::{Result, TournamentError};
use crate::models::battle::{Battle, BattleId, BattleStatus};
use crate::models::category::{Category, CategoryId, NewCategory};
use crate::models::performer::PerformerId;
use crate::models::pool::{Pool, PoolId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Administrative status. Only one tournament may be `Active` at a time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Created,
    Active,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Created => "created",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Current phase of the tournament. Advances linearly, one step at a time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentPhase {
    /// Categories and performers are being registered.
    #[default]
    Registration,
    /// Every performer is scored once.
    Preselection,
    /// Top performers play round robins in pools.
    Pools,
    /// Pool winners play a single-elimination bracket.
    Finals,
    Completed,
}

impl TournamentPhase {
    pub fn next(self) -> Option<Self> {
        use TournamentPhase::*;
        match self {
            Registration => Some(Preselection),
            Preselection => Some(Pools),
            Pools => Some(Finals),
            Finals => Some(Completed),
            Completed => None,
        }
    }
}

impl fmt::Display for TournamentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentPhase::Registration => "registration",
            TournamentPhase::Preselection => "preselection",
            TournamentPhase::Pools => "pools",
            TournamentPhase::Finals => "finals",
            TournamentPhase::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Full tournament state: the unit of locking and of all-or-nothing updates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: NaiveDate,
    pub status: TournamentStatus,
    pub phase: TournamentPhase,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Registration with no categories.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            status: TournamentStatus::Created,
            phase: TournamentPhase::Registration,
            categories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn ensure_registration(&self, action: &str) -> Result<()> {
        if self.phase != TournamentPhase::Registration || self.status.is_terminal() {
            return Err(TournamentError::invalid_transition(
                self.phase,
                self.phase,
                format!("{} is only allowed during registration", action),
            ));
        }
        Ok(())
    }

    /// Add a category (Registration only). Category names are unique (case-insensitive).
    pub fn add_category(&mut self, input: NewCategory) -> Result<CategoryId> {
        self.ensure_registration("adding a category")?;
        let category = Category::new(self.id, input)?;
        if self
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(TournamentError::validation(format!(
                "category '{}' already exists",
                category.name
            )));
        }
        let id = category.id;
        self.categories.push(category);
        Ok(id)
    }

    /// Register a performer in a category (Registration only).
    pub fn register_performer(&mut self, category_id: CategoryId, name: &str) -> Result<PerformerId> {
        self.ensure_registration("registering a performer")?;
        self.category_mut(category_id)
            .ok_or(TournamentError::not_found("category", category_id))?
            .register(name)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Category that owns the battle.
    pub fn category_of_battle(&self, battle_id: BattleId) -> Option<&Category> {
        self.categories.iter().find(|c| c.battle(battle_id).is_some())
    }

    pub fn category_of_battle_mut(&mut self, battle_id: BattleId) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.battle(battle_id).is_some())
    }

    pub fn battle(&self, battle_id: BattleId) -> Option<&Battle> {
        self.categories.iter().find_map(|c| c.battle(battle_id))
    }

    pub fn pool(&self, pool_id: PoolId) -> Option<(&Category, &Pool)> {
        self.categories
            .iter()
            .find_map(|c| c.pool(pool_id).map(|p| (c, p)))
    }

    pub fn battles(&self) -> impl Iterator<Item = &Battle> {
        self.categories.iter().flat_map(|c| c.battles.iter())
    }

    /// The battle currently running, if any.
    pub fn active_battle(&self) -> Option<&Battle> {
        self.battles().find(|b| b.status == BattleStatus::Active)
    }
}
