//! Season Odds - Monte Carlo playoff odds for fantasy football leagues.
//!
//! Replays the unplayed part of a schedule many times from each team's
//! season-to-date scoring pace and folds the replays into per-team expected
//! wins, losses, points, playoff probability and average seed. Python
//! bindings are available behind the `python` feature.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod error;
pub mod matchup;
pub mod playoff;
pub mod projection;
pub mod replay;
pub mod request;
pub mod simulator;
pub mod team;

#[cfg(feature = "python")]
mod python;

pub use aggregate::{
    replay_rng, sort_by_playoff_odds, Execution, MatchupForecast, ReplayAggregator,
    TeamAggregate, TeamStatistics,
};
pub use config::{LeagueSettings, PaceSource, PlayoffSlots, SimulationConfig};
pub use constants::{DEFAULT_SCORE_SPREAD, DEFAULT_SCORE_STDDEV, DEFAULT_SIMULATIONS, REPLAY_CHUNK_SIZE};
pub use error::{Result, SimulationError};
pub use matchup::{GameResult, Matchup, TieResolution};
pub use playoff::{select as select_playoff_field, SeedTieBreak, TeamRecord};
pub use projection::{MatchupProjector, ProjectionModel};
pub use replay::{replay, ReplayOutcome, ReplayRules, SeasonReplay};
pub use request::{run_json, RequestError, SimulationRequest};
pub use simulator::{LeagueContext, SimulationReport, Simulator};
pub use team::{Team, TeamId, TeamPaceSnapshot};
