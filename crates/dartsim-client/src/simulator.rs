//! The public contract of a simulator session.
//!
//! Decision loops are written against [`Simulator`] rather than the concrete
//! TCP client so they can be driven by scripted doubles in tests.

use crate::error::ClientError;
use crate::model::{
    SensorObservations, SensorReading, SimulationParameters, SimulationResults, TeamState,
};
use crate::tactic::Tactic;

/// Operations offered by the mission simulator.
///
/// Every operation blocks until the single response line for its command has
/// been received and decoded. Taking `&mut self` keeps exchanges strictly
/// one at a time.
pub trait Simulator {
    /// Whether a connection to the simulator is currently open.
    fn is_connected(&self) -> bool;

    /// Whether the mission is over.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the simulator
    /// rejects the command.
    fn finished(&mut self) -> Result<bool, ClientError>;

    /// Current team state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn state(&mut self) -> Result<TeamState, ClientError>;

    /// Threat sensor reading for the next `cells` cells.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn read_forward_threat_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError>;

    /// Target sensor reading for the next `cells` cells.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn read_forward_target_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError>;

    /// `observations` consecutive threat sensor readings of `cells` cells.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn read_forward_threat_sensor_for_observations(
        &mut self,
        cells: u32,
        observations: u32,
    ) -> Result<SensorObservations, ClientError>;

    /// `observations` consecutive target sensor readings of `cells` cells.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn read_forward_target_sensor_for_observations(
        &mut self,
        cells: u32,
        observations: u32,
    ) -> Result<SensorObservations, ClientError>;

    /// Applies `tactics` in order and advances the simulation one step,
    /// reporting `decision_time_ms` as the time spent deciding.
    ///
    /// Returns whether the simulator accepted the step.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] for a non-finite decision
    /// time, and other [`ClientError`] variants when the exchange fails.
    fn step<I>(&mut self, tactics: I, decision_time_ms: f64) -> Result<bool, ClientError>
    where
        I: IntoIterator<Item = Tactic>;

    /// Mission results, or `None` before the mission has produced any.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn results(&mut self) -> Result<Option<SimulationResults>, ClientError>;

    /// The simulator's text rendering of the mission.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response is not
    /// a JSON string.
    fn screen_output(&mut self) -> Result<String, ClientError>;

    /// Simulation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the exchange fails or the response does
    /// not decode.
    fn parameters(&mut self) -> Result<SimulationParameters, ClientError>;
}
