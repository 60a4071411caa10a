//! JSON boundary for callers that hold league data as a serialized payload.

use serde::Deserialize;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::simulator::{LeagueContext, SimulationReport, Simulator};

/// Request body: league context plus optional run configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationRequest {
    #[serde(flatten)]
    pub league: LeagueContext,

    #[serde(default)]
    pub config: SimulationConfig,
}

/// Failure to serve a request, split by who has to act on it.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The payload could not be read as league data
    #[error("could not read league data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The data was readable but the simulation rejected it
    #[error("simulation could not run with the supplied data: {0}")]
    Simulation(#[from] SimulationError),
}

pub fn parse(payload: &str) -> Result<SimulationRequest, RequestError> {
    Ok(serde_json::from_str(payload)?)
}

pub fn run(request: &SimulationRequest) -> Result<SimulationReport, RequestError> {
    Ok(Simulator::new(request.config.clone()).run(&request.league)?)
}

/// Parse, simulate and serialize in one step.
pub fn run_json(payload: &str) -> Result<String, RequestError> {
    let report = run(&parse(payload)?)?;
    Ok(serde_json::to_string(&report)?)
}
