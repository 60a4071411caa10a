use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::PlayoffSlots;
use crate::team::TeamId;

/// Win/loss/points line for one team in one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub points: f64,
}

/// Last-resort ordering for teams level on wins and points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedTieBreak {
    #[default]
    TeamIdAscending,
    TeamIdDescending,
}

impl SeedTieBreak {
    fn compare(self, a: TeamId, b: TeamId) -> Ordering {
        match self {
            SeedTieBreak::TeamIdAscending => a.cmp(&b),
            SeedTieBreak::TeamIdDescending => b.cmp(&a),
        }
    }
}

/// Rank teams and return the seeded playoff field.
///
/// Order: wins descending, then points descending, then `tie_break`. The
/// field is truncated to `slots` (or the team count, if smaller); index 0 is
/// the first seed.
pub fn select(
    records: &BTreeMap<TeamId, TeamRecord>,
    slots: PlayoffSlots,
    tie_break: SeedTieBreak,
) -> Vec<TeamId> {
    if slots.get() == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(TeamId, &TeamRecord)> = records.iter().map(|(id, r)| (*id, r)).collect();
    ranked.sort_by(|(id_a, a), (id_b, b)| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.points.total_cmp(&a.points))
            .then_with(|| tie_break.compare(*id_a, *id_b))
    });

    ranked.truncate(slots.get());
    ranked.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(wins: u32, losses: u32, points: f64) -> TeamRecord {
        TeamRecord { wins, losses, points }
    }

    fn league() -> BTreeMap<TeamId, TeamRecord> {
        [
            (TeamId(1), record(8, 5, 1400.0)),
            (TeamId(2), record(10, 3, 1350.0)),
            (TeamId(3), record(8, 5, 1450.0)),
            (TeamId(4), record(5, 8, 1500.0)),
            (TeamId(5), record(8, 5, 1400.0)),
            (TeamId(6), record(3, 10, 1200.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_wins_then_points_then_id() {
        let field = select(&league(), PlayoffSlots::new(4), SeedTieBreak::TeamIdAscending);
        assert_eq!(field, vec![TeamId(2), TeamId(3), TeamId(1), TeamId(5)]);
    }

    #[test]
    fn test_descending_tie_break() {
        let field = select(&league(), PlayoffSlots::new(4), SeedTieBreak::TeamIdDescending);
        assert_eq!(field, vec![TeamId(2), TeamId(3), TeamId(5), TeamId(1)]);
    }

    #[test]
    fn test_slots_clamped_to_team_count() {
        let field = select(&league(), PlayoffSlots::new(10), SeedTieBreak::default());
        assert_eq!(field.len(), 6);
        for id in league().keys() {
            assert!(field.contains(id));
        }
    }

    #[test]
    fn test_zero_slots_is_empty() {
        assert!(select(&league(), PlayoffSlots::NONE, SeedTieBreak::default()).is_empty());
    }
}
