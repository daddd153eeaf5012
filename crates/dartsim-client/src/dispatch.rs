//! Half-duplex command exchange with the simulator.
//!
//! The dispatcher writes one command line and then blocks until exactly one
//! response line arrives. Taking `&mut self` for every exchange means a second
//! command cannot be issued while the first is still waiting for its answer.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use dartsim_config::{ClientConfig, ReconnectPolicy};
use tracing::debug;

use crate::CLIENT_TARGET;
use crate::connection::{Connection, duration_millis, is_timeout};
use crate::error::{ClientError, ConnectionError};

/// Command label used in errors raised before a line is parsed.
const RAW_COMMAND: &str = "command line";

/// Prefix the simulator puts in front of its own error replies.
///
/// The simulator follows an error line with one or more blank lines, so the
/// stream is out of step with the request sequence once one arrives.
pub(crate) const SERVER_ERROR_PREFIX: &str = "error:";

/// Sends command lines and returns their single response line.
pub struct Dispatcher {
    connection: Connection,
    reconnect: ReconnectPolicy,
}

impl Dispatcher {
    /// Builds a dispatcher with an unconnected socket.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::new(config),
            reconnect: config.reconnect,
        }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Mutable access to the underlying connection.
    pub const fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Writes `line` plus a newline terminator and returns the response line
    /// with its terminator stripped.
    ///
    /// When the connection is not open and the policy is
    /// [`ReconnectPolicy::OnDemand`], a connection is opened first. Any I/O
    /// failure tears the socket down so the next command starts afresh. An
    /// `error:` reply is returned as is but also drops the socket, because
    /// the blank lines trailing it would otherwise answer later commands.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] if `line` contains a line
    /// break, and [`ClientError::Connection`] for connect, write, read,
    /// timeout, or end-of-stream failures.
    pub fn send_command(&mut self, line: &str) -> Result<String, ClientError> {
        if line.contains(['\n', '\r']) {
            return Err(ClientError::InvalidArgument {
                command: RAW_COMMAND,
                reason: String::from("command line contains a line break"),
            });
        }

        self.ensure_connected()?;
        let endpoint = self.connection.endpoint().to_string();
        let read_timeout = self.connection.read_timeout();
        let write_timeout = self.connection.write_timeout();
        let Some(stream) = self.connection.stream_mut() else {
            return Err(ConnectionError::NotConnected { endpoint }.into());
        };

        debug!(target: CLIENT_TARGET, command = line, "sending command");
        let outcome = write_line(stream.get_mut(), line)
            .map_err(|error| match write_timeout {
                Some(timeout) if is_timeout(&error) => ConnectionError::Timeout {
                    endpoint: endpoint.clone(),
                    operation: "write",
                    timeout_ms: duration_millis(timeout),
                },
                _ => ConnectionError::Send {
                    endpoint: endpoint.clone(),
                    source: Arc::new(error),
                },
            })
            .and_then(|()| {
                read_response(stream).map_err(|failure| match failure {
                    ReadFailure::Closed => ConnectionError::Closed {
                        endpoint: endpoint.clone(),
                    },
                    ReadFailure::Io(error) => match read_timeout {
                        Some(timeout) if is_timeout(&error) => ConnectionError::Timeout {
                            endpoint: endpoint.clone(),
                            operation: "read",
                            timeout_ms: duration_millis(timeout),
                        },
                        _ => ConnectionError::Receive {
                            endpoint: endpoint.clone(),
                            source: Arc::new(error),
                        },
                    },
                })
            });

        match outcome {
            Ok(response) => {
                debug!(target: CLIENT_TARGET, %response, "received response");
                if response.starts_with(SERVER_ERROR_PREFIX) {
                    self.connection.tear_down("simulator rejected the command");
                }
                Ok(response)
            }
            Err(error) => {
                self.connection.tear_down("I/O failure");
                Err(error.into())
            }
        }
    }

    fn ensure_connected(&mut self) -> Result<(), ConnectionError> {
        if self.connection.is_connected() {
            return Ok(());
        }
        if !self.reconnect.reconnects() {
            return Err(ConnectionError::NotConnected {
                endpoint: self.connection.endpoint().to_string(),
            });
        }
        debug!(
            target: CLIENT_TARGET,
            endpoint = %self.connection.endpoint(),
            "connecting before sending command"
        );
        self.connection.connect()
    }
}

/// Writes the command and its terminator as a single buffer.
pub(crate) fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    let mut framed = String::with_capacity(line.len() + 1);
    framed.push_str(line);
    framed.push('\n');
    writer.write_all(framed.as_bytes())?;
    writer.flush()
}

pub(crate) enum ReadFailure {
    Io(io::Error),
    Closed,
}

/// Reads one newline-terminated line and strips the terminator.
pub(crate) fn read_response<R: BufRead>(reader: &mut R) -> Result<String, ReadFailure> {
    let mut line = String::new();
    let bytes = reader.read_line(&mut line).map_err(ReadFailure::Io)?;
    if bytes == 0 {
        return Err(ReadFailure::Closed);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}
