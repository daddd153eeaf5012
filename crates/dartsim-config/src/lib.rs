//! Shared configuration for the DARTSim protocol client.
//!
//! The client is configured with an explicit [`ClientConfig`] value at
//! construction time. Nothing here reads the environment or global state:
//! binaries build a value (usually from command-line flags) and hand it to
//! the client, which keeps it for the lifetime of the connection.

mod defaults;
mod endpoint;
mod logging;
mod millis;
mod reconnect;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT,
    default_log_filter_string, default_log_format,
};
pub use endpoint::{EndpointParseError, SimulatorEndpoint};
pub use logging::{LogFormat, LogFormatParseError};
pub use reconnect::{ReconnectPolicy, ReconnectPolicyParseError};

/// Connection and logging settings for one simulator client.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Address of the simulator.
    pub endpoint: SimulatorEndpoint,
    /// Upper bound on establishing the TCP connection.
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,
    /// Upper bound on waiting for a response line; `None` blocks indefinitely.
    #[serde(rename = "read_timeout_ms", with = "millis::optional")]
    pub read_timeout: Option<Duration>,
    /// Upper bound on writing a command line; `None` blocks indefinitely.
    #[serde(rename = "write_timeout_ms", with = "millis::optional")]
    pub write_timeout: Option<Duration>,
    /// What to do when a command is issued while disconnected.
    pub reconnect: ReconnectPolicy,
    /// `tracing` filter directive applied by binaries.
    pub log_filter: String,
    /// Output format for log records.
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: SimulatorEndpoint::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
            write_timeout: None,
            reconnect: ReconnectPolicy::default(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration targeting `host:port` with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::default().with_endpoint(SimulatorEndpoint::new(host, port))
    }

    /// Replaces the simulator endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: SimulatorEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Replaces the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets or clears the response read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets or clears the command write timeout.
    #[must_use]
    pub const fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Replaces the reconnect policy.
    #[must_use]
    pub const fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Replaces the log filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Replaces the log output format.
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Address of the simulator.
    #[must_use]
    pub const fn endpoint(&self) -> &SimulatorEndpoint {
        &self.endpoint
    }

    /// `tracing` filter directive for binaries.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
