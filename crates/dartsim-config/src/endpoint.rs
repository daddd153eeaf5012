use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Host, Url};

use crate::defaults::{DEFAULT_HOST, DEFAULT_PORT};

const TCP_SCHEME: &str = "tcp";

/// TCP address of the simulator's adaptation interface.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct SimulatorEndpoint {
    /// Host name or IP literal.
    pub host: String,
    /// TCP port the simulator listens on.
    pub port: u16,
}

impl SimulatorEndpoint {
    /// Builds a TCP endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the `(host, port)` pair suitable for address resolution.
    #[must_use]
    pub fn socket_pair(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for SimulatorEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for SimulatorEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(formatter, "{TCP_SCHEME}://[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{TCP_SCHEME}://{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for SimulatorEndpoint {
    type Err = EndpointParseError;

    /// Accepts `tcp://host:port` as well as a bare `host:port`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)?
        } else {
            Url::parse(&format!("{TCP_SCHEME}://{trimmed}"))?
        };

        if url.scheme() != TCP_SCHEME {
            return Err(EndpointParseError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_owned(),
            Some(Host::Ipv4(address)) => address.to_string(),
            Some(Host::Ipv6(address)) => address.to_string(),
            _ => return Err(EndpointParseError::MissingHost(input.to_owned())),
        };
        let port = url
            .port()
            .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
        Ok(Self::new(host, port))
    }
}

/// Errors encountered while parsing a [`SimulatorEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised.
    #[error("unsupported simulator scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
