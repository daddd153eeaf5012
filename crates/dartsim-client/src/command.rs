//! Command modelling for simulator requests.
//!
//! This module encapsulates the transformation from typed commands into the
//! single-line text exchanged with the simulator so the client remains focused
//! on IO orchestration.

use std::fmt::Write as _;

use crate::error::ClientError;
use crate::tactic::Tactic;

/// One request understood by the simulator's adaptation interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Asks whether the mission is over.
    Finished,
    /// Requests the team state.
    GetState,
    /// Reads the long-range threat sensor.
    ReadForwardThreatSensor {
        /// Number of cells ahead to read.
        cells: u32,
    },
    /// Reads the long-range target sensor.
    ReadForwardTargetSensor {
        /// Number of cells ahead to read.
        cells: u32,
    },
    /// Reads several threat sensor observations at once.
    ReadForwardThreatSensorForObservations {
        /// Number of cells ahead to read.
        cells: u32,
        /// Number of observations.
        observations: u32,
    },
    /// Reads several target sensor observations at once.
    ReadForwardTargetSensorForObservations {
        /// Number of cells ahead to read.
        cells: u32,
        /// Number of observations.
        observations: u32,
    },
    /// Applies tactics and advances the simulation one step.
    Step {
        /// Tactics to apply, in order.
        tactics: Vec<Tactic>,
        /// Time the caller spent deciding, in milliseconds.
        decision_time_ms: f64,
    },
    /// Requests the mission results.
    GetResults,
    /// Requests the simulator's rendered screen output.
    GetScreenOutput,
    /// Requests the simulation parameters.
    GetParameters,
}

impl Command {
    /// Wire name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::GetState => "getState",
            Self::ReadForwardThreatSensor { .. } => "readForwardThreatSensor",
            Self::ReadForwardTargetSensor { .. } => "readForwardTargetSensor",
            Self::ReadForwardThreatSensorForObservations { .. } => {
                "readForwardThreatSensorForObservations"
            }
            Self::ReadForwardTargetSensorForObservations { .. } => {
                "readForwardTargetSensorForObservations"
            }
            Self::Step { .. } => "step",
            Self::GetResults => "getResults",
            Self::GetScreenOutput => "getScreenOutput",
            Self::GetParameters => "getParameters",
        }
    }

    /// Renders the command as `<name>[ <arg>...]` without a line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] when a step's decision time is
    /// not a finite number.
    pub fn to_line(&self) -> Result<String, ClientError> {
        let mut line = String::from(self.name());
        match self {
            Self::ReadForwardThreatSensor { cells } | Self::ReadForwardTargetSensor { cells } => {
                push_argument(&mut line, cells);
            }
            Self::ReadForwardThreatSensorForObservations {
                cells,
                observations,
            }
            | Self::ReadForwardTargetSensorForObservations {
                cells,
                observations,
            } => {
                push_argument(&mut line, cells);
                push_argument(&mut line, observations);
            }
            Self::Step {
                tactics,
                decision_time_ms,
            } => {
                if !decision_time_ms.is_finite() {
                    return Err(ClientError::InvalidArgument {
                        command: self.name(),
                        reason: format!("decision time {decision_time_ms} is not finite"),
                    });
                }
                let encoded =
                    serde_json::to_string(tactics).map_err(|error| ClientError::InvalidArgument {
                        command: self.name(),
                        reason: error.to_string(),
                    })?;
                push_argument(&mut line, encoded);
                push_argument(&mut line, decision_time_ms);
            }
            Self::Finished
            | Self::GetState
            | Self::GetResults
            | Self::GetScreenOutput
            | Self::GetParameters => {}
        }
        Ok(line)
    }
}

fn push_argument(line: &mut String, argument: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = write!(line, " {argument}");
}
