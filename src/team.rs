use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::matchup::Matchup;

/// Stable league-assigned team identifier (the roster id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for TeamId {
    fn from(id: u32) -> Self {
        TeamId(id)
    }
}

/// Team as seen at simulation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "team_id", alias = "roster_id")]
    pub id: TeamId,

    #[serde(alias = "team_name", alias = "owner_name", default)]
    pub name: String,

    /// Points scored so far this season
    #[serde(alias = "total_points", default)]
    pub cumulative_points: f64,

    /// Weeks that contributed to `cumulative_points`
    #[serde(default)]
    pub weeks_played: u32,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>, cumulative_points: f64, weeks_played: u32) -> Self {
        Team {
            id: TeamId(id),
            name: name.into(),
            cumulative_points,
            weeks_played,
        }
    }
}

/// Frozen view of every team's season-to-date scoring.
///
/// Projections read from this snapshot for the whole replay; it is never
/// advanced as simulated weeks are played.
#[derive(Clone, Debug, Default)]
pub struct TeamPaceSnapshot {
    teams: BTreeMap<TeamId, Team>,
}

impl TeamPaceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from roster totals.
    pub fn from_teams<'a>(teams: impl IntoIterator<Item = &'a Team>) -> Self {
        let mut snapshot = Self::new();
        for team in teams {
            snapshot.insert(team.clone());
        }
        snapshot
    }

    /// Build from bare cumulative points; names fall back to the id.
    pub fn from_points(points: impl IntoIterator<Item = (TeamId, f64)>) -> Self {
        let mut snapshot = Self::new();
        for (id, cumulative_points) in points {
            snapshot.insert(Team::new(id.0, id.to_string(), cumulative_points, 0));
        }
        snapshot
    }

    /// Sum the recorded scores of decided matchups played before `current_week`.
    ///
    /// Names are taken from `roster` where available.
    pub fn from_matchup_history(matchups: &[Matchup], current_week: u32, roster: &[Team]) -> Self {
        let mut snapshot = Self::new();
        for team in roster {
            snapshot.insert(Team::new(team.id.0, team.name.clone(), 0.0, 0));
        }

        for matchup in matchups.iter().filter(|m| m.week < current_week) {
            let Some((score1, score2)) = matchup.recorded_scores() else {
                continue;
            };
            for (id, score) in [(matchup.team1, score1), (matchup.team2, score2)] {
                let team = snapshot
                    .teams
                    .entry(id)
                    .or_insert_with(|| Team::new(id.0, id.to_string(), 0.0, 0));
                team.cumulative_points += score;
                team.weeks_played += 1;
            }
        }

        snapshot
    }

    pub fn insert(&mut self, team: Team) {
        self.teams.insert(team.id, team);
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn contains(&self, id: TeamId) -> bool {
        self.teams.contains_key(&id)
    }

    pub fn cumulative_points(&self, id: TeamId) -> Option<f64> {
        self.teams.get(&id).map(|t| t.cumulative_points)
    }

    /// Display name, or the formatted id for teams missing from the snapshot.
    pub fn name(&self, id: TeamId) -> String {
        self.teams
            .get(&id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
