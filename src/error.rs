use crate::team::TeamId;

/// Input errors raised before any replay runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("cannot project week {week}: pace needs at least one played week")]
    InvalidProjectionInput { week: u32 },

    #[error("simulation count must be between 1 and 4294967295, got {count}")]
    InvalidSimulationCount { count: i64 },

    #[error("invalid matchup in week {week} ({team1} vs {team2}): {reason}")]
    MatchupValidationError {
        week: u32,
        team1: TeamId,
        team2: TeamId,
        reason: String,
    },

    #[error("playoff slot count cannot be negative, got {slots}")]
    InvalidPlayoffSlotCount { slots: i64 },

    #[error("invalid projection model: {reason}")]
    InvalidProjectionModel { reason: String },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
