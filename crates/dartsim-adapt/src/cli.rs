//! Command-line interface for the adaptation manager.

use std::num::NonZeroU32;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dartsim_config::{
    ClientConfig, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, LogFormat, SimulatorEndpoint,
};

use crate::manager::DEFAULT_HORIZON;

/// How the mission report is written to stdout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Screen output followed by a plain-text summary.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

/// Flies a DARTSim mission with a simple reactive strategy.
#[derive(Parser, Debug)]
#[command(name = "dartsim-adapt", version)]
pub struct Cli {
    /// Simulator host name or address.
    #[arg(value_name = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Simulator TCP port.
    #[arg(value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Number of cells ahead the forward sensors are read for.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: NonZeroU32,
    /// Tracing filter directive, for example `dartsim_client=debug`.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log line format.
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,
    /// How the mission report is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,
    /// Gives up on a response after this many milliseconds.
    #[arg(long, value_name = "MILLIS")]
    pub read_timeout_ms: Option<u64>,
}

impl Cli {
    /// Client configuration described by the flags.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_endpoint(SimulatorEndpoint::new(self.host.as_str(), self.port))
            .with_read_timeout(self.read_timeout_ms.map(Duration::from_millis))
            .with_log_filter(self.log_filter.as_str())
            .with_log_format(self.log_format)
    }
}
