use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::aggregate::{MatchupForecast, TeamStatistics};
use crate::constants::{DEFAULT_SCORE_SPREAD, DEFAULT_SCORE_STDDEV, DEFAULT_SIMULATIONS};
use crate::request::{self, RequestError};
use crate::simulator::SimulationReport;

fn to_py_err(e: RequestError) -> PyErr {
    match e {
        RequestError::Malformed(_) => PyValueError::new_err(e.to_string()),
        RequestError::Simulation(_) => PyRuntimeError::new_err(e.to_string()),
    }
}

#[pymethods]
impl TeamStatistics {
    #[getter]
    fn team_id(&self) -> u32 {
        self.team_id.0
    }

    fn __repr__(&self) -> String {
        format!(
            "TeamStatistics({:?}, wins={}, playoff={}%)",
            self.team_name, self.average_wins, self.playoff_percentage
        )
    }
}

#[pymethods]
impl MatchupForecast {
    #[getter]
    fn team1(&self) -> u32 {
        self.team1.0
    }

    #[getter]
    fn team2(&self) -> u32 {
        self.team2.0
    }

    fn __repr__(&self) -> String {
        format!(
            "MatchupForecast(week {}: {} {} - {} {})",
            self.week, self.team1, self.team1_average_score, self.team2_average_score, self.team2
        )
    }
}

#[pymethods]
impl SimulationReport {
    /// Same JSON document `simulate_season` returns.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(self).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationReport({} teams, {} replays, seed {})",
            self.standings.len(),
            self.replays,
            self.seed
        )
    }
}

/// Simulate the rest of a season and return the report object.
///
/// Takes the JSON request (`settings`, `teams`, `matchups`, optional `config`).
/// Unreadable payloads raise `ValueError`; data the simulation rejects raises
/// `RuntimeError`.
#[pyfunction]
fn simulate(py: Python<'_>, payload: &str) -> PyResult<SimulationReport> {
    py.allow_threads(|| request::run(&request::parse(payload)?))
        .map_err(to_py_err)
}

/// Like `simulate`, but returns the report as a JSON string.
#[pyfunction]
fn simulate_season(py: Python<'_>, payload: &str) -> PyResult<String> {
    py.allow_threads(|| request::run_json(payload)).map_err(to_py_err)
}

/// Python module definition
#[pymodule]
fn season_odds(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SimulationReport>()?;
    m.add_class::<TeamStatistics>()?;
    m.add_class::<MatchupForecast>()?;

    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_season, m)?)?;

    // Constants
    m.add("DEFAULT_SCORE_SPREAD", DEFAULT_SCORE_SPREAD)?;
    m.add("DEFAULT_SCORE_STDDEV", DEFAULT_SCORE_STDDEV)?;
    m.add("DEFAULT_SIMULATIONS", DEFAULT_SIMULATIONS)?;

    Ok(())
}
