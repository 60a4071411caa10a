use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::aggregate::{sort_by_playoff_odds, Execution, MatchupForecast, ReplayAggregator, TeamStatistics};
use crate::config::{LeagueSettings, PaceSource, SimulationConfig};
use crate::error::Result;
use crate::matchup::Matchup;
use crate::projection::MatchupProjector;
use crate::replay::ReplayRules;
use crate::team::{Team, TeamPaceSnapshot};

/// Everything the engine needs to know about a league, supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueContext {
    #[serde(default)]
    pub settings: LeagueSettings,
    pub teams: Vec<Team>,
    pub matchups: Vec<Matchup>,
}

impl LeagueContext {
    pub fn new(settings: LeagueSettings, teams: Vec<Team>, matchups: Vec<Matchup>) -> Self {
        LeagueContext {
            settings,
            teams,
            matchups,
        }
    }

    pub fn pace_snapshot(&self, source: PaceSource) -> TeamPaceSnapshot {
        match source {
            PaceSource::Roster => TeamPaceSnapshot::from_teams(&self.teams),
            PaceSource::MatchupHistory => {
                TeamPaceSnapshot::from_matchup_history(&self.matchups, self.settings.current_week, &self.teams)
            }
        }
    }
}

/// Output of [`Simulator::run`].
#[cfg_attr(feature = "python", pyo3::pyclass(module = "season_odds"))]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Sorted by playoff odds
    #[cfg_attr(feature = "python", pyo3(get))]
    pub standings: Vec<TeamStatistics>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub matchups: Vec<MatchupForecast>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub replays: u32,
    /// Fewer replays than requested ran before the time budget ran out
    #[cfg_attr(feature = "python", pyo3(get))]
    pub truncated: bool,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub seed: u64,
}

/// Stateless entry point: every call takes the full league context.
#[derive(Clone, Debug, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Simulator { config }
    }

    pub fn run(&self, league: &LeagueContext) -> Result<SimulationReport> {
        let start = Instant::now();
        league.settings.validate()?;
        let slots = league.settings.slots()?;
        let requested = self.config.simulations()?;
        let projector = MatchupProjector::new(self.config.projection)?;
        let rules = ReplayRules {
            ties: self.config.tie_resolution,
            seed_tie_break: self.config.seed_tie_break,
        };
        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let execution = if self.config.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        };

        let pace = league.pace_snapshot(self.config.pace_source);
        info!(
            teams = pace.len(),
            matchups = league.matchups.len(),
            undecided = league.matchups.iter().filter(|m| !m.is_decided()).count(),
            requested,
            seed,
            ?execution,
            "starting season simulation"
        );

        let aggregate = ReplayAggregator::new(projector, rules)
            .with_deadline(self.config.deadline_from(start))
            .accumulate_seeded(&league.matchups, slots, &pace, requested, seed, execution)?;

        let mut standings = aggregate.team_statistics(&pace);
        sort_by_playoff_odds(&mut standings);
        let matchups = aggregate.matchup_forecasts(&league.matchups);

        info!(
            replays = aggregate.replays(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "season simulation complete"
        );

        Ok(SimulationReport {
            standings,
            matchups,
            replays: aggregate.replays(),
            truncated: aggregate.replays() < requested,
            seed,
        })
    }
}
