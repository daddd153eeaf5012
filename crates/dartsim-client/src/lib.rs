//! Blocking client for the DARTSim adaptation interface.
//!
//! The simulator listens on a TCP socket and speaks a line protocol: the
//! client writes one ASCII command per line and reads exactly one response
//! line back, which is either a bare `true`/`false` literal or a JSON value.
//! This crate owns the socket ([`Connection`]), the one-at-a-time exchange
//! ([`Dispatcher`]), the typed command vocabulary ([`Command`], [`Tactic`]),
//! and the [`decode`] functions that turn response lines into the data model.
//!
//! [`DartSimClient`] ties these together behind the [`Simulator`] trait, which
//! decision loops use so they can be exercised against scripted doubles.
//!
//! All logging uses the `dartsim_client` tracing target. The crate never
//! installs a subscriber.

mod client;
mod command;
mod connection;
pub mod decode;
mod dispatch;
mod error;
mod model;
mod simulator;
mod tactic;

pub use client::DartSimClient;
pub use command::Command;
pub use connection::{Connection, ConnectionStatus};
pub use dartsim_config::{
    ClientConfig, DEFAULT_PORT, EndpointParseError, LogFormat, ReconnectPolicy, SimulatorEndpoint,
};
pub use dispatch::Dispatcher;
pub use error::{ClientError, ConnectionError, DecodeError, ProtocolError};
pub use model::{
    Coordinate, DownwardLookingSensorParams, Formation, LongRangeSensorParams, SensorObservations,
    SensorReading, SimulationParameters, SimulationResults, TeamConfiguration, TeamState,
    ThreatParams,
};
pub use simulator::Simulator;
pub use tactic::{Tactic, TacticParseError};

/// Tracing target for every event emitted by this crate.
pub(crate) const CLIENT_TARGET: &str = "dartsim_client";

#[cfg(test)]
mod tests;
