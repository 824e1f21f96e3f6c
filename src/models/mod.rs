//! Data structures for the battle tournament: tournaments, categories, performers, pools, battles.

mod battle;
mod bracket;
mod category;
mod performer;
mod pool;
mod score;
mod tournament;

pub use battle::{
    Battle, BattleId, BattlePhase, BattleResult, BattleStatus, Outcome, OutcomeType,
    PerformerScore, ScoreEntry,
};
pub use bracket::{Bracket, BracketRound, BracketSlot};
pub use category::{Category, CategoryId, Format, NewCategory};
pub use performer::{Performer, PerformerId, PoolRecord};
pub use pool::{Pool, PoolId};
pub use score::Score;
pub use tournament::{Tournament, TournamentId, TournamentPhase, TournamentStatus};
