/// Half-width of the uniform perturbation added to a team's pace (points)
pub const DEFAULT_SCORE_SPREAD: f64 = 20.0;

/// Standard deviation used by the normal projection model (points)
pub const DEFAULT_SCORE_STDDEV: f64 = 30.0;

/// Number of replays when the caller does not ask for a specific count
pub const DEFAULT_SIMULATIONS: u32 = 1_000;

/// Replays per work unit when aggregating from a seed.
///
/// Chunk boundaries fix the order in which partial sums are merged, so this
/// value is part of the reproducibility contract for seeded runs.
pub const REPLAY_CHUNK_SIZE: u32 = 1_000;

/// Decimal places kept on projected scores and reported statistics
pub const SCORE_DECIMALS: i32 = 2;

/// Round to [`SCORE_DECIMALS`] places.
pub fn round_score(value: f64) -> f64 {
    let scale = 10f64.powi(SCORE_DECIMALS);
    (value * scale).round() / scale
}
