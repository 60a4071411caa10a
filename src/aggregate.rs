use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::PlayoffSlots;
use crate::constants::{round_score, REPLAY_CHUNK_SIZE};
use crate::error::{Result, SimulationError};
use crate::matchup::Matchup;
use crate::projection::MatchupProjector;
use crate::replay::{ReplayOutcome, ReplayRules, SeasonReplay};
use crate::team::{TeamId, TeamPaceSnapshot};

/// Running per-team sums across replays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TeamAccumulator {
    wins: u64,
    losses: u64,
    points: f64,
    playoff_count: u64,
    /// Sum of 1-indexed seeds over the replays where the team qualified
    seed_sum: u64,
}

impl TeamAccumulator {
    fn merge(&mut self, other: &TeamAccumulator) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.points += other.points;
        self.playoff_count += other.playoff_count;
        self.seed_sum += other.seed_sum;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MatchupTally {
    team1_points: f64,
    team2_points: f64,
    team1_wins: u64,
    team2_wins: u64,
}

impl MatchupTally {
    fn merge(&mut self, other: &MatchupTally) {
        self.team1_points += other.team1_points;
        self.team2_points += other.team2_points;
        self.team1_wins += other.team1_wins;
        self.team2_wins += other.team2_wins;
    }
}

/// Folded state of every replay seen so far.
///
/// Size depends on the number of teams and matchups only, never on how many
/// replays were recorded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamAggregate {
    teams: BTreeMap<TeamId, TeamAccumulator>,
    matchups: Vec<MatchupTally>,
    replays: u32,
}

impl TeamAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replays(&self) -> u32 {
        self.replays
    }

    /// Fold one replay into the running sums.
    pub fn record(&mut self, outcome: &ReplayOutcome) {
        for (id, record) in &outcome.records {
            let acc = self.teams.entry(*id).or_default();
            acc.wins += u64::from(record.wins);
            acc.losses += u64::from(record.losses);
            acc.points += record.points;
        }

        for (idx, id) in outcome.playoff_field.iter().enumerate() {
            let acc = self.teams.entry(*id).or_default();
            acc.playoff_count += 1;
            acc.seed_sum += idx as u64 + 1;
        }

        if self.matchups.len() < outcome.scores.len() {
            self.matchups.resize(outcome.scores.len(), MatchupTally::default());
        }
        for (tally, &(score1, score2)) in self.matchups.iter_mut().zip(&outcome.scores) {
            tally.team1_points += score1;
            tally.team2_points += score2;
            if score1 > score2 {
                tally.team1_wins += 1;
            } else if score2 > score1 {
                tally.team2_wins += 1;
            }
        }

        self.replays += 1;
    }

    /// Sum-reduce another partial aggregate into this one.
    pub fn merge(&mut self, other: &TeamAggregate) {
        for (id, acc) in &other.teams {
            self.teams.entry(*id).or_default().merge(acc);
        }

        if self.matchups.len() < other.matchups.len() {
            self.matchups.resize(other.matchups.len(), MatchupTally::default());
        }
        for (tally, theirs) in self.matchups.iter_mut().zip(&other.matchups) {
            tally.merge(theirs);
        }

        self.replays += other.replays;
    }

    /// Normalize the sums into one statistics row per team, ordered by id.
    pub fn team_statistics(&self, pace: &TeamPaceSnapshot) -> Vec<TeamStatistics> {
        if self.replays == 0 {
            return Vec::new();
        }
        let n = f64::from(self.replays);

        self.teams
            .iter()
            .map(|(id, acc)| TeamStatistics {
                team_id: *id,
                team_name: pace.name(*id),
                average_wins: round_score(acc.wins as f64 / n),
                average_losses: round_score(acc.losses as f64 / n),
                playoff_percentage: round_score(100.0 * acc.playoff_count as f64 / n),
                average_seed: (acc.playoff_count > 0)
                    .then(|| round_score(acc.seed_sum as f64 / acc.playoff_count as f64)),
                average_total_points: round_score(acc.points / n),
            })
            .collect()
    }

    /// Mean projected result for each undecided matchup in `matchups`.
    ///
    /// `matchups` must be the schedule the replays were run on. Exact ties
    /// count toward neither side's win percentage.
    pub fn matchup_forecasts(&self, matchups: &[Matchup]) -> Vec<MatchupForecast> {
        if self.replays == 0 {
            return Vec::new();
        }
        let n = f64::from(self.replays);

        matchups
            .iter()
            .zip(&self.matchups)
            .filter(|(m, _)| !m.is_decided())
            .map(|(m, tally)| MatchupForecast {
                week: m.week,
                team1: m.team1,
                team2: m.team2,
                team1_average_score: round_score(tally.team1_points / n),
                team2_average_score: round_score(tally.team2_points / n),
                team1_win_percentage: round_score(100.0 * tally.team1_wins as f64 / n),
                team2_win_percentage: round_score(100.0 * tally.team2_wins as f64 / n),
            })
            .collect()
    }
}

/// Per-team result of a simulation run.
#[cfg_attr(feature = "python", pyo3::pyclass(module = "season_odds"))]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
    pub team_id: TeamId,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub team_name: String,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub average_wins: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub average_losses: f64,
    /// 0 to 100
    #[cfg_attr(feature = "python", pyo3(get))]
    pub playoff_percentage: f64,
    /// Mean seed over the replays in which the team qualified
    #[cfg_attr(feature = "python", pyo3(get))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_seed: Option<f64>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub average_total_points: f64,
}

/// Presentation order: playoff odds, then average wins, then team id.
pub fn sort_by_playoff_odds(stats: &mut [TeamStatistics]) {
    stats.sort_by(|a, b| {
        b.playoff_percentage
            .total_cmp(&a.playoff_percentage)
            .then_with(|| b.average_wins.total_cmp(&a.average_wins))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
}

/// Averaged projection for one unplayed game.
#[cfg_attr(feature = "python", pyo3::pyclass(module = "season_odds"))]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupForecast {
    #[cfg_attr(feature = "python", pyo3(get))]
    pub week: u32,
    pub team1: TeamId,
    pub team2: TeamId,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub team1_average_score: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub team2_average_score: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub team1_win_percentage: f64,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub team2_win_percentage: f64,
}

/// How seeded replays are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    Sequential,
    #[default]
    Parallel,
}

/// Generator for replay `index` of a seeded run: one ChaCha stream per replay.
pub fn replay_rng(seed: u64, index: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(index));
    rng
}

/// Runs a schedule many times and folds the replays into statistics.
#[derive(Clone, Debug, Default)]
pub struct ReplayAggregator {
    projector: MatchupProjector,
    rules: ReplayRules,
    deadline: Option<Instant>,
}

impl ReplayAggregator {
    pub fn new(projector: MatchupProjector, rules: ReplayRules) -> Self {
        ReplayAggregator {
            projector,
            rules,
            deadline: None,
        }
    }

    /// Stop starting new replays after `deadline`. The first replay always runs.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Replay `num_simulations` times drawing from `rng` and return per-team statistics.
    pub fn aggregate<R: Rng + ?Sized>(
        &self,
        matchups: &[Matchup],
        slots: PlayoffSlots,
        pace: &TeamPaceSnapshot,
        num_simulations: u32,
        rng: &mut R,
    ) -> Result<Vec<TeamStatistics>> {
        let aggregate = self.accumulate(matchups, slots, pace, num_simulations, rng)?;
        Ok(aggregate.team_statistics(pace))
    }

    /// Sequential replays sharing the caller's generator.
    pub fn accumulate<R: Rng + ?Sized>(
        &self,
        matchups: &[Matchup],
        slots: PlayoffSlots,
        pace: &TeamPaceSnapshot,
        num_simulations: u32,
        rng: &mut R,
    ) -> Result<TeamAggregate> {
        let season = self.prepare(matchups, slots, pace, num_simulations)?;

        let mut aggregate = TeamAggregate::new();
        for index in 0..num_simulations {
            if index > 0 && self.deadline_passed() {
                warn!(completed = index, requested = num_simulations, "time budget exhausted");
                break;
            }
            aggregate.record(&season.run(rng)?);
        }
        Ok(aggregate)
    }

    /// Replays with independent per-replay streams derived from `seed`.
    ///
    /// Replays run in fixed chunks whose partial sums are merged in chunk
    /// order, so `Sequential` and `Parallel` give bit-identical results.
    /// Parallel runs hand the pool one wave of chunks per thread at a time,
    /// which bounds the partials held before merging.
    pub fn accumulate_seeded(
        &self,
        matchups: &[Matchup],
        slots: PlayoffSlots,
        pace: &TeamPaceSnapshot,
        num_simulations: u32,
        seed: u64,
        execution: Execution,
    ) -> Result<TeamAggregate> {
        let season = self.prepare(matchups, slots, pace, num_simulations)?;
        let mut chunks = chunk_ranges(num_simulations, REPLAY_CHUNK_SIZE);
        let mut aggregate = TeamAggregate::new();

        match execution {
            Execution::Sequential => {
                for range in chunks {
                    aggregate.merge(&self.run_chunk(&season, seed, range)?);
                }
            }
            Execution::Parallel => {
                let wave_size = rayon::current_num_threads().max(1);
                loop {
                    let wave: Vec<Range<u32>> = chunks.by_ref().take(wave_size).collect();
                    if wave.is_empty() {
                        break;
                    }
                    let partials: Vec<TeamAggregate> = wave
                        .into_par_iter()
                        .map(|range| self.run_chunk(&season, seed, range))
                        .collect::<Result<_>>()?;
                    for partial in &partials {
                        aggregate.merge(partial);
                    }
                }
            }
        }

        if aggregate.replays() < num_simulations {
            warn!(
                completed = aggregate.replays(),
                requested = num_simulations,
                "time budget exhausted"
            );
        }
        Ok(aggregate)
    }

    fn prepare<'a>(
        &'a self,
        matchups: &'a [Matchup],
        slots: PlayoffSlots,
        pace: &'a TeamPaceSnapshot,
        num_simulations: u32,
    ) -> Result<SeasonReplay<'a>> {
        if num_simulations == 0 {
            return Err(SimulationError::InvalidSimulationCount {
                count: i64::from(num_simulations),
            });
        }
        let season = SeasonReplay::new(matchups, slots, pace, &self.projector).with_rules(self.rules);
        season.validate()?;
        Ok(season)
    }

    fn run_chunk(&self, season: &SeasonReplay<'_>, seed: u64, range: Range<u32>) -> Result<TeamAggregate> {
        let start = range.start;
        let mut aggregate = TeamAggregate::new();

        for index in range {
            if index > 0 && self.deadline_passed() {
                break;
            }
            let mut rng = replay_rng(seed, index);
            aggregate.record(&season.run(&mut rng)?);
        }

        debug!(start, replays = aggregate.replays(), "replay chunk complete");
        Ok(aggregate)
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

fn chunk_ranges(total: u32, chunk_size: u32) -> impl Iterator<Item = Range<u32>> {
    (0..total)
        .step_by(chunk_size as usize)
        .map(move |start| start..total.min(start.saturating_add(chunk_size)))
}
