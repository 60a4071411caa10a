use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::team::{TeamId, TeamPaceSnapshot};

/// One scheduled game.
///
/// A game is decided when both scores are recorded and non-zero; anything
/// else is projected during a replay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub team1: TeamId,
    pub team2: TeamId,
    #[serde(default)]
    pub team1_score: Option<f64>,
    #[serde(default)]
    pub team2_score: Option<f64>,
}

impl Matchup {
    pub fn undecided(week: u32, team1: u32, team2: u32) -> Self {
        Matchup {
            week,
            team1: TeamId(team1),
            team2: TeamId(team2),
            team1_score: None,
            team2_score: None,
        }
    }

    pub fn decided(
        week: u32,
        team1: u32,
        team2: u32,
        team1_score: f64,
        team2_score: f64,
    ) -> Self {
        Matchup {
            team1_score: Some(team1_score),
            team2_score: Some(team2_score),
            ..Self::undecided(week, team1, team2)
        }
    }

    /// Final scores, if the game has been played.
    pub fn recorded_scores(&self) -> Option<(f64, f64)> {
        match (self.team1_score, self.team2_score) {
            (Some(s1), Some(s2)) if is_recorded(s1) && is_recorded(s2) => Some((s1, s2)),
            _ => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.recorded_scores().is_some()
    }

    /// Check the matchup against the pace snapshot it will be replayed with.
    pub fn validate(&self, pace: &TeamPaceSnapshot) -> Result<()> {
        if self.team1 == self.team2 {
            return Err(self.invalid("a team cannot play itself"));
        }
        for id in [self.team1, self.team2] {
            if !pace.contains(id) {
                return Err(self.invalid(format!("team {id} is missing from the pace snapshot")));
            }
        }
        if self.week == 0 && !self.is_decided() {
            return Err(SimulationError::InvalidProjectionInput { week: 0 });
        }
        Ok(())
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> SimulationError {
        SimulationError::MatchupValidationError {
            week: self.week,
            team1: self.team1,
            team2: self.team2,
            reason: reason.into(),
        }
    }
}

fn is_recorded(score: f64) -> bool {
    score != 0.0 && score.is_finite()
}

/// How an exact score tie is credited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieResolution {
    /// Neither side gets a win or a loss
    #[default]
    NoDecision,
    /// team1 only wins on a strictly greater score
    SecondTeamWins,
}

/// Result of a single game from team1's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Team1Win,
    Team2Win,
    Tie,
}

impl GameResult {
    pub fn classify(score1: f64, score2: f64, ties: TieResolution) -> Self {
        if score1 > score2 {
            GameResult::Team1Win
        } else if score2 > score1 {
            GameResult::Team2Win
        } else {
            match ties {
                TieResolution::NoDecision => GameResult::Tie,
                TieResolution::SecondTeamWins => GameResult::Team2Win,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TeamPaceSnapshot {
        TeamPaceSnapshot::from_points([(TeamId(1), 500.0), (TeamId(2), 400.0)])
    }

    #[test]
    fn test_decided_requires_both_nonzero_scores() {
        assert!(Matchup::decided(1, 1, 2, 101.5, 99.0).is_decided());
        assert!(!Matchup::decided(1, 1, 2, 101.5, 0.0).is_decided());
        assert!(!Matchup::undecided(1, 1, 2).is_decided());

        let partial = Matchup {
            team2_score: None,
            ..Matchup::decided(1, 1, 2, 88.0, 77.0)
        };
        assert!(!partial.is_decided());
    }

    #[test]
    fn test_validate_rejects_self_matchup() {
        let err = Matchup::undecided(3, 1, 1).validate(&snapshot()).unwrap_err();
        assert!(matches!(err, SimulationError::MatchupValidationError { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_team() {
        let err = Matchup::undecided(3, 1, 9).validate(&snapshot()).unwrap_err();
        assert!(matches!(err, SimulationError::MatchupValidationError { .. }));
    }

    #[test]
    fn test_validate_rejects_undecided_week_zero() {
        let err = Matchup::undecided(0, 1, 2).validate(&snapshot()).unwrap_err();
        assert_eq!(err, SimulationError::InvalidProjectionInput { week: 0 });

        assert!(Matchup::decided(0, 1, 2, 90.0, 80.0).validate(&snapshot()).is_ok());
    }

    #[test]
    fn test_classify() {
        assert_eq!(GameResult::classify(100.0, 90.0, TieResolution::NoDecision), GameResult::Team1Win);
        assert_eq!(GameResult::classify(90.0, 100.0, TieResolution::NoDecision), GameResult::Team2Win);
        assert_eq!(GameResult::classify(95.5, 95.5, TieResolution::NoDecision), GameResult::Tie);
        assert_eq!(GameResult::classify(95.5, 95.5, TieResolution::SecondTeamWins), GameResult::Team2Win);
    }

    #[test]
    fn test_deserialize_partial_scores() {
        let m: Matchup = serde_json::from_str(r#"{"week": 4, "team1": 1, "team2": 2, "team1_score": 112.4}"#).unwrap();
        assert_eq!(m.team1_score, Some(112.4));
        assert_eq!(m.team2_score, None);
        assert!(!m.is_decided());
    }
}
