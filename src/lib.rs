//! Battle tournament engine: phase and battle lifecycles, pool and bracket generation,
//! standings, and a JSON API.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod models;
pub mod roster;

pub use config::ServerConfig;
pub use engine::Engine;
pub use error::{Result, TournamentError};
pub use logic::{
    advance_phase, phase_validation, rank, record_outcome, seed_bracket, start_battle,
    PhaseGenerator, PhaseValidation, Seeding, Standing, Standings,
};
pub use models::{
    Battle, BattleId, BattlePhase, BattleStatus, Category, CategoryId, Format, NewCategory,
    Outcome, OutcomeType, Performer, PerformerId, Pool, PoolId, Score, Tournament, TournamentId,
    TournamentPhase, TournamentStatus,
};
