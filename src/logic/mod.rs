//! Tournament business logic: lifecycle controllers, phase generation, standings.

mod battle;
mod generator;
mod lifecycle;
mod standings;

pub use battle::{record_outcome, start_battle, BattleCompleted, CompletionObserver, PhaseGenerator};
pub use generator::{
    distribute, finalists, generate, on_battle_completed, preselection_groups, round_robin_pairs,
    settle_pool, Generated,
};
pub use lifecycle::{advance_phase, cancel, phase_validation, PhaseValidation};
pub use standings::{
    points_for, rank, rank_by_preselection, record_for, seed_bracket, Seeding, Standing, Standings,
};
