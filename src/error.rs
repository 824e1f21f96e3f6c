//! Error kinds shared by the lifecycle controllers, the generator and the engine.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
///
/// Every failing operation leaves the tournament aggregate exactly as it was.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// State machine precondition violated (stale state or caller bug).
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// A global invariant (one active tournament, one active battle) would be broken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Outcome shape or phase precondition failed; one entry per blocker.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl TournamentError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        TournamentError::NotFound { entity, id }
    }

    pub fn invalid_transition(
        from: impl ToString,
        to: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        TournamentError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(blocker: impl Into<String>) -> Self {
        TournamentError::Validation(vec![blocker.into()])
    }

    /// Only conflicts may succeed when retried after a refresh.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TournamentError::Conflict(_))
    }

    /// Short machine-readable kind (used in API error bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            TournamentError::NotFound { .. } => "not_found",
            TournamentError::InvalidTransition { .. } => "invalid_transition",
            TournamentError::Conflict(_) => "conflict",
            TournamentError::Validation(_) => "validation",
        }
    }
}

pub type Result<T> = std::result::Result<T, TournamentError>;
