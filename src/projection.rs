use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::constants::{round_score, DEFAULT_SCORE_SPREAD, DEFAULT_SCORE_STDDEV};
use crate::error::{Result, SimulationError};

/// Noise added on top of a team's pace when projecting an unplayed game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ProjectionModel {
    /// pace + U(-spread, +spread)
    Uniform {
        #[serde(default = "default_spread")]
        spread: f64,
    },
    /// pace + N(0, std_dev)
    Normal {
        #[serde(default = "default_std_dev")]
        std_dev: f64,
    },
}

fn default_spread() -> f64 {
    DEFAULT_SCORE_SPREAD
}

fn default_std_dev() -> f64 {
    DEFAULT_SCORE_STDDEV
}

impl Default for ProjectionModel {
    fn default() -> Self {
        ProjectionModel::Uniform {
            spread: DEFAULT_SCORE_SPREAD,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Noise {
    Uniform(Uniform<f64>),
    Normal(Normal),
}

impl Noise {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Noise::Uniform(d) => d.sample(rng),
            Noise::Normal(d) => d.sample(rng),
        }
    }
}

/// Produces simulated score pairs for undecided matchups.
///
/// Holds no RNG of its own: every call draws from the generator it is handed,
/// so one projector can be shared by any number of concurrent replays.
#[derive(Clone, Debug)]
pub struct MatchupProjector {
    model: ProjectionModel,
    noise: Noise,
}

impl MatchupProjector {
    pub fn new(model: ProjectionModel) -> Result<Self> {
        let noise = match model {
            ProjectionModel::Uniform { spread } => {
                if !spread.is_finite() || spread < 0.0 {
                    return Err(SimulationError::InvalidProjectionModel {
                        reason: format!("uniform spread must be finite and non-negative, got {spread}"),
                    });
                }
                // rand scales the width by 1 / (1 - EPSILON) and panics if that overflows
                if !(2.0 * spread / (1.0 - f64::EPSILON)).is_finite() {
                    return Err(SimulationError::InvalidProjectionModel {
                        reason: format!("uniform spread {spread} is too wide to sample"),
                    });
                }
                Noise::Uniform(Uniform::new_inclusive(-spread, spread))
            }
            ProjectionModel::Normal { std_dev } => {
                let normal = Normal::new(0.0, std_dev).map_err(|e| SimulationError::InvalidProjectionModel {
                    reason: format!("normal std_dev {std_dev}: {e}"),
                })?;
                Noise::Normal(normal)
            }
        };

        Ok(MatchupProjector { model, noise })
    }

    pub fn model(&self) -> ProjectionModel {
        self.model
    }

    /// Points-per-week average observed through `week`.
    pub fn baseline(cumulative_points: f64, week: u32) -> Result<f64> {
        if week == 0 {
            return Err(SimulationError::InvalidProjectionInput { week });
        }
        Ok(cumulative_points / week as f64)
    }

    /// Simulate one game.
    ///
    /// Each side scores its baseline plus an independent noise draw, rounded
    /// to two decimals. `week` must be at least 1.
    pub fn project<R: Rng + ?Sized>(
        &self,
        team1_points: f64,
        team2_points: f64,
        week: u32,
        rng: &mut R,
    ) -> Result<(f64, f64)> {
        let base1 = Self::baseline(team1_points, week)?;
        let base2 = Self::baseline(team2_points, week)?;

        let score1 = round_score(base1 + self.noise.draw(rng));
        let score2 = round_score(base2 + self.noise.draw(rng));

        Ok((score1, score2))
    }
}

impl Default for MatchupProjector {
    fn default() -> Self {
        MatchupProjector {
            model: ProjectionModel::default(),
            noise: Noise::Uniform(Uniform::new_inclusive(-DEFAULT_SCORE_SPREAD, DEFAULT_SCORE_SPREAD)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use statrs::statistics::Statistics;

    #[test]
    fn test_week_zero_rejected() {
        let projector = MatchupProjector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = projector.project(500.0, 400.0, 0, &mut rng).unwrap_err();
        assert_eq!(err, SimulationError::InvalidProjectionInput { week: 0 });
    }

    #[test]
    fn test_scores_within_spread() {
        let projector = MatchupProjector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1_000 {
            let (s1, s2) = projector.project(500.0, 400.0, 5, &mut rng).unwrap();
            assert!((80.0..=120.0).contains(&s1), "score {} outside pace +/- 20", s1);
            assert!((60.0..=100.0).contains(&s2), "score {} outside pace +/- 20", s2);
            assert_eq!(s1, round_score(s1));
        }
    }

    #[test]
    fn test_zero_spread_is_exact_pace() {
        let projector = MatchupProjector::new(ProjectionModel::Uniform { spread: 0.0 }).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let (s1, s2) = projector.project(1000.0, 333.0, 3, &mut rng).unwrap();
        assert_eq!(s1, 333.33);
        assert_eq!(s2, 111.0);
    }

    #[test]
    fn test_seeded_projection_is_deterministic() {
        let projector = MatchupProjector::default();
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);

        for week in 1..10 {
            assert_eq!(
                projector.project(800.0, 750.0, week, &mut rng1).unwrap(),
                projector.project(800.0, 750.0, week, &mut rng2).unwrap()
            );
        }
    }

    #[test]
    fn test_mean_converges_to_pace() {
        let projector = MatchupProjector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        let (a, b): (Vec<f64>, Vec<f64>) = (0..10_000)
            .map(|_| projector.project(500.0, 400.0, 5, &mut rng).unwrap())
            .unzip();

        let mean_a = a.iter().mean();
        let mean_b = b.iter().mean();
        assert!((mean_a - 100.0).abs() < 2.0, "team A mean {}", mean_a);
        assert!((mean_b - 80.0).abs() < 2.0, "team B mean {}", mean_b);
    }

    #[test]
    fn test_invalid_models_rejected() {
        assert!(MatchupProjector::new(ProjectionModel::Uniform { spread: -1.0 }).is_err());
        assert!(MatchupProjector::new(ProjectionModel::Uniform { spread: f64::NAN }).is_err());
        assert!(MatchupProjector::new(ProjectionModel::Normal { std_dev: 0.0 }).is_err());
    }

    #[test]
    fn test_overflowing_spread_rejected() {
        for spread in [1e308, f64::MAX / 2.0] {
            assert!(matches!(
                MatchupProjector::new(ProjectionModel::Uniform { spread }),
                Err(SimulationError::InvalidProjectionModel { .. })
            ));
        }

        let wide = MatchupProjector::new(ProjectionModel::Uniform { spread: 1e300 }).unwrap();
        let (s1, _) = wide.project(500.0, 400.0, 5, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert!(s1.is_finite());
    }

    #[test]
    fn test_normal_model_projects() {
        let projector = MatchupProjector::new(ProjectionModel::Normal { std_dev: 30.0 }).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let (s1, s2) = projector.project(1200.0, 1100.0, 12, &mut rng).unwrap();
        assert!(s1.is_finite() && s2.is_finite());
    }
}
