//! The TCP-backed simulator client.

use dartsim_config::{ClientConfig, SimulatorEndpoint};
use tracing::debug;

use crate::CLIENT_TARGET;
use crate::command::Command;
use crate::connection::ConnectionStatus;
use crate::decode;
use crate::dispatch::Dispatcher;
use crate::error::ClientError;
use crate::model::{
    SensorObservations, SensorReading, SimulationParameters, SimulationResults, TeamState,
};
use crate::simulator::Simulator;
use crate::tactic::Tactic;

/// A session with one DARTSim instance.
///
/// The client owns its socket exclusively. It starts disconnected; call
/// [`DartSimClient::connect`] explicitly or let the first command connect
/// under [`ReconnectPolicy::OnDemand`](dartsim_config::ReconnectPolicy).
///
/// ```no_run
/// use dartsim_client::{ClientConfig, DartSimClient, Simulator, Tactic};
///
/// let mut client = DartSimClient::new(&ClientConfig::new("localhost", 5418));
/// client.connect()?;
/// while !client.finished()? {
///     let altitude = client.state()?.config.altitude_level;
///     let tactics = if altitude > 1 { vec![Tactic::DecAlt] } else { Vec::new() };
///     client.step(tactics, 0.0)?;
/// }
/// # Ok::<(), dartsim_client::ClientError>(())
/// ```
pub struct DartSimClient {
    dispatcher: Dispatcher,
}

impl DartSimClient {
    /// Builds an unconnected client.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
        }
    }

    /// Endpoint this client talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &SimulatorEndpoint {
        self.dispatcher.connection().endpoint()
    }

    /// Opens the connection, replacing any open one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] when the simulator cannot be
    /// reached.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.dispatcher.connection_mut().connect()?;
        Ok(())
    }

    /// Current connection status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.dispatcher.connection().status()
    }

    /// Releases the socket. Safe to call more than once.
    pub fn close(&mut self) {
        self.dispatcher.connection_mut().close();
    }

    /// Sends a raw command line and returns the raw response line.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the line contains a line break or the
    /// exchange fails.
    pub fn send_command(&mut self, line: &str) -> Result<String, ClientError> {
        self.dispatcher.send_command(line)
    }

    /// Renders and sends a typed command, returning the raw response line.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the command cannot be rendered or the
    /// exchange fails.
    pub fn execute(&mut self, command: &Command) -> Result<String, ClientError> {
        let line = command.to_line()?;
        debug!(target: CLIENT_TARGET, command = command.name(), "executing command");
        self.dispatcher.send_command(&line)
    }
}

impl Simulator for DartSimClient {
    fn is_connected(&self) -> bool {
        self.dispatcher.connection().is_connected()
    }

    fn finished(&mut self) -> Result<bool, ClientError> {
        let command = Command::Finished;
        let response = self.execute(&command)?;
        decode::flag(command.name(), &response)
    }

    fn state(&mut self) -> Result<TeamState, ClientError> {
        let response = self.execute(&Command::GetState)?;
        decode::team_state(&response)
    }

    fn read_forward_threat_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError> {
        let command = Command::ReadForwardThreatSensor { cells };
        let response = self.execute(&command)?;
        decode::sensor_reading(command.name(), &response)
    }

    fn read_forward_target_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError> {
        let command = Command::ReadForwardTargetSensor { cells };
        let response = self.execute(&command)?;
        decode::sensor_reading(command.name(), &response)
    }

    fn read_forward_threat_sensor_for_observations(
        &mut self,
        cells: u32,
        observations: u32,
    ) -> Result<SensorObservations, ClientError> {
        let command = Command::ReadForwardThreatSensorForObservations {
            cells,
            observations,
        };
        let response = self.execute(&command)?;
        decode::sensor_observations(command.name(), &response)
    }

    fn read_forward_target_sensor_for_observations(
        &mut self,
        cells: u32,
        observations: u32,
    ) -> Result<SensorObservations, ClientError> {
        let command = Command::ReadForwardTargetSensorForObservations {
            cells,
            observations,
        };
        let response = self.execute(&command)?;
        decode::sensor_observations(command.name(), &response)
    }

    fn step<I>(&mut self, tactics: I, decision_time_ms: f64) -> Result<bool, ClientError>
    where
        I: IntoIterator<Item = Tactic>,
    {
        let command = Command::Step {
            tactics: tactics.into_iter().collect(),
            decision_time_ms,
        };
        let response = self.execute(&command)?;
        decode::flag(command.name(), &response)
    }

    fn results(&mut self) -> Result<Option<SimulationResults>, ClientError> {
        let response = self.execute(&Command::GetResults)?;
        decode::results(&response)
    }

    fn screen_output(&mut self) -> Result<String, ClientError> {
        let response = self.execute(&Command::GetScreenOutput)?;
        decode::screen_output(&response)
    }

    fn parameters(&mut self) -> Result<SimulationParameters, ClientError> {
        let response = self.execute(&Command::GetParameters)?;
        decode::parameters(&response)
    }
}
