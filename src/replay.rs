use rand::Rng;
use std::collections::BTreeMap;

use crate::config::PlayoffSlots;
use crate::error::Result;
use crate::matchup::{GameResult, Matchup, TieResolution};
use crate::playoff::{self, SeedTieBreak, TeamRecord};
use crate::projection::MatchupProjector;
use crate::team::{TeamId, TeamPaceSnapshot};

/// Policy points applied while folding games into standings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayRules {
    pub ties: TieResolution,
    pub seed_tie_break: SeedTieBreak,
}

/// Result of one simulated completion of the season.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayOutcome {
    /// Final standings for every team referenced by any matchup
    pub records: BTreeMap<TeamId, TeamRecord>,

    /// Seeded playoff field; index 0 is the first seed
    pub playoff_field: Vec<TeamId>,

    /// Final score pair for each matchup, in schedule order
    pub scores: Vec<(f64, f64)>,
}

impl ReplayOutcome {
    /// 1-indexed seed, if the team qualified.
    pub fn seed_of(&self, team: TeamId) -> Option<usize> {
        self.playoff_field.iter().position(|id| *id == team).map(|idx| idx + 1)
    }
}

/// A season schedule bound to the pace snapshot and rules it is replayed with.
#[derive(Clone, Copy, Debug)]
pub struct SeasonReplay<'a> {
    matchups: &'a [Matchup],
    slots: PlayoffSlots,
    pace: &'a TeamPaceSnapshot,
    projector: &'a MatchupProjector,
    rules: ReplayRules,
}

impl<'a> SeasonReplay<'a> {
    pub fn new(
        matchups: &'a [Matchup],
        slots: PlayoffSlots,
        pace: &'a TeamPaceSnapshot,
        projector: &'a MatchupProjector,
    ) -> Self {
        SeasonReplay {
            matchups,
            slots,
            pace,
            projector,
            rules: ReplayRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ReplayRules) -> Self {
        self.rules = rules;
        self
    }

    /// Validate every matchup up front so no replay can fail midway.
    pub fn validate(&self) -> Result<()> {
        self.matchups.iter().try_for_each(|m| m.validate(self.pace))
    }

    /// Play the remaining schedule once.
    ///
    /// Decided games keep their recorded scores. Undecided games are projected
    /// from the snapshot pace, which stays fixed for the whole replay.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ReplayOutcome> {
        let mut records: BTreeMap<TeamId, TeamRecord> = BTreeMap::new();
        let mut scores = Vec::with_capacity(self.matchups.len());

        for matchup in self.matchups {
            let (score1, score2) = match matchup.recorded_scores() {
                Some(recorded) => recorded,
                None => self.projector.project(
                    self.cumulative_points(matchup, matchup.team1)?,
                    self.cumulative_points(matchup, matchup.team2)?,
                    matchup.week,
                    rng,
                )?,
            };

            let result = GameResult::classify(score1, score2, self.rules.ties);
            {
                let team1 = records.entry(matchup.team1).or_default();
                team1.points += score1;
                match result {
                    GameResult::Team1Win => team1.wins += 1,
                    GameResult::Team2Win => team1.losses += 1,
                    GameResult::Tie => {}
                }
            }
            {
                let team2 = records.entry(matchup.team2).or_default();
                team2.points += score2;
                match result {
                    GameResult::Team1Win => team2.losses += 1,
                    GameResult::Team2Win => team2.wins += 1,
                    GameResult::Tie => {}
                }
            }

            scores.push((score1, score2));
        }

        let playoff_field = playoff::select(&records, self.slots, self.rules.seed_tie_break);

        Ok(ReplayOutcome {
            records,
            playoff_field,
            scores,
        })
    }

    fn cumulative_points(&self, matchup: &Matchup, team: TeamId) -> Result<f64> {
        self.pace
            .cumulative_points(team)
            .ok_or_else(|| matchup.invalid(format!("team {team} is missing from the pace snapshot")))
    }
}

/// Validate and replay a schedule once with the default projector and rules.
pub fn replay<R: Rng + ?Sized>(
    matchups: &[Matchup],
    slots: PlayoffSlots,
    pace: &TeamPaceSnapshot,
    rng: &mut R,
) -> Result<ReplayOutcome> {
    let projector = MatchupProjector::default();
    let season = SeasonReplay::new(matchups, slots, pace, &projector);
    season.validate()?;
    season.run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pace() -> TeamPaceSnapshot {
        TeamPaceSnapshot::from_points([
            (TeamId(1), 500.0),
            (TeamId(2), 450.0),
            (TeamId(3), 400.0),
            (TeamId(4), 350.0),
        ])
    }

    fn decided_schedule() -> Vec<Matchup> {
        vec![
            Matchup::decided(1, 1, 2, 120.0, 100.0),
            Matchup::decided(1, 3, 4, 90.0, 95.5),
            Matchup::decided(2, 1, 3, 80.0, 110.0),
            Matchup::decided(2, 2, 4, 101.25, 101.25),
        ]
    }

    #[test]
    fn test_decided_games_use_recorded_scores() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = replay(&decided_schedule(), PlayoffSlots::new(2), &pace(), &mut rng).unwrap();

        assert_eq!(outcome.records[&TeamId(1)], TeamRecord { wins: 1, losses: 1, points: 200.0 });
        assert_eq!(outcome.records[&TeamId(3)], TeamRecord { wins: 1, losses: 1, points: 200.0 });
        // Tie in week 2: points only
        assert_eq!(outcome.records[&TeamId(2)], TeamRecord { wins: 0, losses: 1, points: 201.25 });
        assert_eq!(outcome.records[&TeamId(4)], TeamRecord { wins: 1, losses: 0, points: 196.75 });

        // 1, 3 and 4 all have one win; 1 and 3 share 200 points, lower id first
        assert_eq!(outcome.playoff_field, vec![TeamId(1), TeamId(3)]);
        assert_eq!(outcome.seed_of(TeamId(3)), Some(2));
        assert_eq!(outcome.seed_of(TeamId(4)), None);
        assert_eq!(outcome.scores[1], (90.0, 95.5));
    }

    #[test]
    fn test_second_team_wins_ties() {
        let projector = MatchupProjector::default();
        let schedule = decided_schedule();
        let pace = pace();
        let rules = ReplayRules {
            ties: TieResolution::SecondTeamWins,
            ..ReplayRules::default()
        };
        let season = SeasonReplay::new(&schedule, PlayoffSlots::NONE, &pace, &projector).with_rules(rules);

        let outcome = season.run(&mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(outcome.records[&TeamId(4)].wins, 2);
        assert_eq!(outcome.records[&TeamId(2)].losses, 2);
        assert!(outcome.playoff_field.is_empty());
    }

    #[test]
    fn test_every_team_appears_once_and_wins_balance_losses() {
        let schedule = vec![
            Matchup::decided(1, 1, 2, 110.0, 99.0),
            Matchup::undecided(2, 1, 3),
            Matchup::undecided(2, 2, 4),
            Matchup::undecided(3, 4, 1),
            Matchup::undecided(3, 3, 2),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..200 {
            let outcome = replay(&schedule, PlayoffSlots::new(3), &pace(), &mut rng).unwrap();
            assert_eq!(outcome.records.len(), 4);
            assert_eq!(outcome.playoff_field.len(), 3);

            let wins: u32 = outcome.records.values().map(|r| r.wins).sum();
            let losses: u32 = outcome.records.values().map(|r| r.losses).sum();
            assert_eq!(wins, losses);
        }
    }

    #[test]
    fn test_pace_is_not_advanced_within_replay() {
        let projector = crate::projection::MatchupProjector::new(crate::projection::ProjectionModel::Uniform {
            spread: 0.0,
        })
        .unwrap();
        let pace = TeamPaceSnapshot::from_points([(TeamId(1), 400.0), (TeamId(2), 200.0)]);
        let schedule = vec![Matchup::undecided(4, 1, 2), Matchup::undecided(5, 2, 1)];
        let season = SeasonReplay::new(&schedule, PlayoffSlots::new(1), &pace, &projector);

        let outcome = season.run(&mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        // Week 5 still divides the original 400 / 200 totals
        assert_eq!(outcome.scores, vec![(100.0, 50.0), (40.0, 80.0)]);
    }

    #[test]
    fn test_replay_rejects_invalid_schedule() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = replay(&[Matchup::undecided(1, 2, 2)], PlayoffSlots::new(1), &pace(), &mut rng).unwrap_err();
        assert!(matches!(err, SimulationError::MatchupValidationError { .. }));
    }
}
