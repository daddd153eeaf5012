//! Socket ownership for a simulator session.
//!
//! [`Connection`] owns the TCP stream and tracks whether it is usable. It is a
//! small state machine: a fresh value is `Disconnected`, `connect` moves it to
//! `Connected`, any I/O failure on the stream tears it back down to
//! `Disconnected`, and `close` moves it to `Closed`. Connecting is blocking, so
//! there is no observable in-between state.

use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use dartsim_config::{ClientConfig, SimulatorEndpoint};
use tracing::{debug, warn};

use crate::CLIENT_TARGET;
use crate::error::ConnectionError;

/// Externally observable connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No socket has been opened yet, or the last one failed.
    Disconnected,
    /// A socket is open and ready for the next command.
    Connected,
    /// The caller closed the connection.
    Closed,
}

enum ConnectionState {
    Disconnected,
    Connected(BufReader<TcpStream>),
    Closed,
}

/// Owns the TCP stream to the simulator.
pub struct Connection {
    endpoint: SimulatorEndpoint,
    connect_timeout: Duration,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    state: ConnectionState,
}

impl Connection {
    /// Builds an unconnected handle from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            state: ConnectionState::Disconnected,
        }
    }

    /// Endpoint this connection targets.
    #[must_use]
    pub const fn endpoint(&self) -> &SimulatorEndpoint {
        &self.endpoint
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        match self.state {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connected(_) => ConnectionStatus::Connected,
            ConnectionState::Closed => ConnectionStatus::Closed,
        }
    }

    /// Returns true when a socket is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Opens a new TCP connection, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Resolve`] when the host does not resolve,
    /// [`ConnectionError::Timeout`] when the connect timeout elapses, and
    /// [`ConnectionError::Connect`] for any other failure. The previous socket
    /// is released either way.
    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        self.release();
        let stream = self.open_stream()?;
        debug!(
            target: CLIENT_TARGET,
            endpoint = %self.endpoint,
            "connected to simulator"
        );
        self.state = ConnectionState::Connected(BufReader::new(stream));
        Ok(())
    }

    /// Releases the socket. Closing an already closed connection is a no-op.
    pub fn close(&mut self) {
        if self.release() {
            debug!(
                target: CLIENT_TARGET,
                endpoint = %self.endpoint,
                "closed simulator connection"
            );
        }
        self.state = ConnectionState::Closed;
    }

    /// Gives the dispatcher access to the open stream.
    pub(crate) fn stream_mut(&mut self) -> Option<&mut BufReader<TcpStream>> {
        match &mut self.state {
            ConnectionState::Connected(stream) => Some(stream),
            ConnectionState::Disconnected | ConnectionState::Closed => None,
        }
    }

    /// Drops a socket whose stream can no longer be trusted.
    pub(crate) fn tear_down(&mut self, reason: &'static str) {
        if self.release() {
            warn!(
                target: CLIENT_TARGET,
                endpoint = %self.endpoint,
                reason,
                "dropping simulator connection"
            );
        }
        self.state = ConnectionState::Disconnected;
    }

    pub(crate) const fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub(crate) const fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Shuts the socket down if one is open; returns whether one was.
    fn release(&mut self) -> bool {
        let stream = match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected(stream) => stream,
            other => {
                self.state = other;
                return false;
            }
        };
        if let Err(error) = stream.get_ref().shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(
                target: CLIENT_TARGET,
                endpoint = %self.endpoint,
                %error,
                "socket shutdown reported an error"
            );
        }
        true
    }

    fn open_stream(&self) -> Result<TcpStream, ConnectionError> {
        let endpoint_display = self.endpoint.to_string();
        let addresses = resolve_tcp_addresses(&self.endpoint).map_err(|error| {
            ConnectionError::Resolve {
                endpoint: endpoint_display.clone(),
                source: Arc::new(error),
            }
        })?;

        let mut last_error = None;
        for address in addresses {
            match TcpStream::connect_timeout(&address, self.connect_timeout) {
                Ok(stream) => {
                    self.configure(&stream)
                        .map_err(|source| ConnectionError::Connect {
                            endpoint: endpoint_display.clone(),
                            source: Arc::new(source),
                        })?;
                    return Ok(stream);
                }
                Err(error) => {
                    debug!(
                        target: CLIENT_TARGET,
                        %address,
                        %error,
                        "connection attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses")
        });
        if is_timeout(&error) {
            return Err(ConnectionError::Timeout {
                endpoint: endpoint_display,
                operation: "connect",
                timeout_ms: duration_millis(self.connect_timeout),
            });
        }
        Err(ConnectionError::Connect {
            endpoint: endpoint_display,
            source: Arc::new(error),
        })
    }

    fn configure(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;
        stream.set_nodelay(true)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.release();
    }
}

fn resolve_tcp_addresses(endpoint: &SimulatorEndpoint) -> io::Result<Vec<SocketAddr>> {
    let addresses: Vec<SocketAddr> = endpoint.socket_pair().to_socket_addrs()?.collect();
    if addresses.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "no resolved addresses",
        ));
    }
    Ok(addresses)
}

/// Read and write timeouts surface as `WouldBlock` on Unix and `TimedOut`
/// elsewhere.
pub(crate) fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn config_for(listener: &TcpListener) -> ClientConfig {
        let port = listener.local_addr().expect("local addr").port();
        ClientConfig::new("127.0.0.1", port)
    }

    #[test]
    fn starts_disconnected() {
        let connection = Connection::new(&ClientConfig::default());
        assert_eq!(connection.status(), ConnectionStatus::Disconnected);
        assert!(!connection.is_connected());
    }

    #[test]
    fn connect_then_close_transitions() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let mut connection = Connection::new(&config_for(&listener));

        connection.connect().expect("connects");
        assert_eq!(connection.status(), ConnectionStatus::Connected);

        connection.close();
        assert_eq!(connection.status(), ConnectionStatus::Closed);
        assert!(!connection.is_connected());
    }

    #[test]
    fn closing_twice_is_harmless() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let mut connection = Connection::new(&config_for(&listener));
        connection.connect().expect("connects");

        connection.close();
        connection.close();
        assert_eq!(connection.status(), ConnectionStatus::Closed);
    }

    #[test]
    fn closing_before_connecting_is_harmless() {
        let mut connection = Connection::new(&ClientConfig::default());
        connection.close();
        assert_eq!(connection.status(), ConnectionStatus::Closed);
    }

    #[test]
    fn refused_connection_is_reported() {
        let port = {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
            listener.local_addr().expect("local addr").port()
        };
        let mut connection = Connection::new(&ClientConfig::new("127.0.0.1", port));

        let error = connection.connect().expect_err("nothing listens on the port");
        assert!(matches!(error, ConnectionError::Connect { .. }));
        assert_eq!(connection.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn tear_down_returns_to_disconnected() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let mut connection = Connection::new(&config_for(&listener));
        connection.connect().expect("connects");

        connection.tear_down("test");
        assert_eq!(connection.status(), ConnectionStatus::Disconnected);
        assert!(connection.stream_mut().is_none());
    }

    #[test]
    fn unresolvable_host_is_reported() {
        let mut connection = Connection::new(&ClientConfig::new("simulator.invalid", 5418));
        let error = connection.connect().expect_err("host does not resolve");
        assert!(matches!(error, ConnectionError::Resolve { .. }));
    }
}
