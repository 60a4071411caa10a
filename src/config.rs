use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::constants::DEFAULT_SIMULATIONS;
use crate::error::{Result, SimulationError};
use crate::matchup::TieResolution;
use crate::playoff::SeedTieBreak;
use crate::projection::ProjectionModel;

/// Number of playoff qualifiers per replay. Zero means no playoffs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlayoffSlots(usize);

impl PlayoffSlots {
    pub const NONE: PlayoffSlots = PlayoffSlots(0);

    pub fn new(slots: usize) -> Self {
        PlayoffSlots(slots)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for PlayoffSlots {
    type Error = SimulationError;

    fn try_from(slots: i64) -> Result<Self> {
        usize::try_from(slots)
            .map(PlayoffSlots)
            .map_err(|_| SimulationError::InvalidPlayoffSlotCount { slots })
    }
}

/// League-level settings supplied by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    #[serde(default, alias = "playoff_teams")]
    pub playoff_slots: Option<i64>,

    #[serde(default = "default_current_week", alias = "leg")]
    pub current_week: u32,
}

fn default_current_week() -> u32 {
    1
}

impl Default for LeagueSettings {
    fn default() -> Self {
        LeagueSettings {
            playoff_slots: None,
            current_week: default_current_week(),
        }
    }
}

impl LeagueSettings {
    pub fn new(playoff_slots: i64, current_week: u32) -> Self {
        LeagueSettings {
            playoff_slots: Some(playoff_slots),
            current_week,
        }
    }

    /// Validated slot count; an absent value means no playoffs.
    pub fn slots(&self) -> Result<PlayoffSlots> {
        self.playoff_slots
            .map(PlayoffSlots::try_from)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn validate(&self) -> Result<()> {
        if self.current_week == 0 {
            return Err(SimulationError::InvalidProjectionInput { week: 0 });
        }
        self.slots().map(|_| ())
    }
}

/// Where season-to-date points come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceSource {
    /// `cumulative_points` reported on each team
    #[default]
    Roster,
    /// Recorded scores of decided matchups before the current week
    MatchupHistory,
}

/// Knobs for one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// As read; [`SimulationConfig::simulations`] checks the range
    pub num_simulations: i64,

    /// Fixed seed for reproducible runs; drawn from entropy when absent
    pub seed: Option<u64>,

    pub projection: ProjectionModel,

    pub tie_resolution: TieResolution,

    pub seed_tie_break: SeedTieBreak,

    pub pace_source: PaceSource,

    /// Spread replays across the rayon pool
    pub parallel: bool,

    /// Stop starting new replays once this much wall time has elapsed
    pub time_budget_ms: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_simulations: i64::from(DEFAULT_SIMULATIONS),
            seed: None,
            projection: ProjectionModel::default(),
            tie_resolution: TieResolution::default(),
            seed_tie_break: SeedTieBreak::default(),
            pace_source: PaceSource::default(),
            parallel: true,
            time_budget_ms: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn with_simulations(mut self, num_simulations: i64) -> Self {
        self.num_simulations = num_simulations;
        self
    }

    /// Validated replay count.
    pub fn simulations(&self) -> Result<u32> {
        u32::try_from(self.num_simulations)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(SimulationError::InvalidSimulationCount {
                count: self.num_simulations,
            })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.time_budget().map(|budget| start + budget)
    }
}
