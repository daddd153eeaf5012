//! Test support for client behaviour coverage.
//!
//! Supplies the scripted fake simulator and the world shared by BDD steps so
//! step definitions and unit tests stay focused on their assertions.

mod fake_simulator;

use std::cell::RefCell;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use rstest::fixture;

use crate::{
    ClientConfig, ClientError, DartSimClient, ReconnectPolicy, SensorObservations,
    SensorReading, SimulationParameters, SimulationResults, Simulator, TeamState,
};

pub(crate) use fake_simulator::{FakeSimulator, Reply};

/// Builds a client configuration pointing at a local fake.
pub(crate) fn local_config(port: u16) -> ClientConfig {
    ClientConfig::new("127.0.0.1", port).with_connect_timeout(Duration::from_secs(2))
}

/// Decoded value produced by the last client call.
#[derive(Debug)]
pub(crate) enum Outcome {
    Flag(bool),
    State(TeamState),
    Reading(SensorReading),
    Observations(SensorObservations),
    Results(Option<SimulationResults>),
    Parameters(SimulationParameters),
}

/// Scenario state: the scripted replies, the fake, and the client under test.
///
/// The client is declared before the fake so it is dropped first; the fake
/// joins its thread on drop and would otherwise wait for the next request.
#[derive(Default)]
pub(crate) struct TestWorld {
    client: Option<DartSimClient>,
    simulator: Option<FakeSimulator>,
    script: Vec<Reply>,
    reconnect: ReconnectPolicy,
    read_timeout: Option<Duration>,
    outcome: Option<Result<Outcome, ClientError>>,
}

impl TestWorld {
    pub(crate) fn script(&mut self, reply: Reply) {
        self.script.push(reply);
    }

    pub(crate) const fn set_reconnect(&mut self, policy: ReconnectPolicy) {
        self.reconnect = policy;
    }

    pub(crate) const fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }

    /// Starts the fake with the replies scripted so far and builds the client.
    pub(crate) fn client(&mut self) -> Result<&mut DartSimClient> {
        if self.simulator.is_none() {
            let simulator = FakeSimulator::spawn(std::mem::take(&mut self.script))?;
            let config = local_config(simulator.port())
                .with_reconnect(self.reconnect)
                .with_read_timeout(self.read_timeout);
            self.client = Some(DartSimClient::new(&config));
            self.simulator = Some(simulator);
        }
        self.client.as_mut().context("client not built")
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        self.client()?.connect().context("connect to fake simulator")
    }

    /// Runs one client call and records its outcome.
    pub(crate) fn call<F>(&mut self, operation: F) -> Result<()>
    where
        F: FnOnce(&mut DartSimClient) -> Result<Outcome, ClientError>,
    {
        let client = self.client()?;
        self.outcome = Some(operation(client));
        Ok(())
    }

    pub(crate) fn outcome(&self) -> Result<&Outcome> {
        match self.outcome.as_ref().context("no call recorded")? {
            Ok(outcome) => Ok(outcome),
            Err(error) => Err(anyhow::anyhow!("call failed: {error}")),
        }
    }

    pub(crate) fn error(&self) -> Result<&ClientError> {
        match self.outcome.as_ref().context("no call recorded")? {
            Ok(outcome) => Err(anyhow::anyhow!("call succeeded with {outcome:?}")),
            Err(error) => Ok(error),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.client.as_ref().is_some_and(Simulator::is_connected)
    }

    pub(crate) fn requests(&self) -> Result<Vec<String>> {
        self.simulator
            .as_ref()
            .context("fake simulator not started")?
            .requests()
    }

    pub(crate) fn assert_connections(&self, expected: usize) -> Result<()> {
        let actual = self
            .simulator
            .as_ref()
            .context("fake simulator not started")?
            .connections()?;
        ensure!(
            actual == expected,
            "expected {expected} connections but saw {actual}"
        );
        Ok(())
    }
}

#[fixture]
pub(crate) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
