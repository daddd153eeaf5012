//! Error taxonomy for simulator sessions.
//!
//! Failures fall into three families: the socket misbehaved
//! ([`ConnectionError`]), the response line did not have the shape the issued
//! command promises ([`ProtocolError`]), or a field inside an otherwise
//! well-formed payload carried the wrong JSON type ([`DecodeError`]).
//! [`ClientError`] wraps all three so every public operation returns a single
//! error type. I/O errors are held in `Arc` to satisfy the `result_large_err`
//! Clippy lint.

use std::io;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Socket-level failures. Always fatal to the command in progress.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Host name resolution failed or produced no usable address.
    #[error("failed to resolve simulator address {endpoint}: {source}")]
    Resolve {
        /// Endpoint being resolved.
        endpoint: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The TCP connection could not be established.
    #[error("failed to connect to simulator at {endpoint}: {source}")]
    Connect {
        /// Endpoint being connected to.
        endpoint: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A configured timeout elapsed before the operation completed.
    #[error("{operation} on {endpoint} timed out after {timeout_ms}ms")]
    Timeout {
        /// Endpoint of the connection.
        endpoint: String,
        /// Operation that timed out (`connect`, `read` or `write`).
        operation: &'static str,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A command was issued while disconnected and reconnecting is disabled.
    #[error("not connected to simulator at {endpoint}")]
    NotConnected {
        /// Endpoint the client is configured for.
        endpoint: String,
    },

    /// Writing the command line failed.
    #[error("failed to send command to simulator at {endpoint}: {source}")]
    Send {
        /// Endpoint of the connection.
        endpoint: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Reading the response line failed.
    #[error("failed to read response from simulator at {endpoint}: {source}")]
    Receive {
        /// Endpoint of the connection.
        endpoint: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The simulator closed the stream before sending a response line.
    #[error("simulator at {endpoint} closed the connection")]
    Closed {
        /// Endpoint of the connection.
        endpoint: String,
    },
}

impl ConnectionError {
    /// Returns true when the failure was a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// The response line does not match the shape expected for the command.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The response was not valid JSON.
    #[error("response to '{command}' is not valid JSON: {source}")]
    InvalidJson {
        /// Command whose response failed to parse.
        command: &'static str,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but has the wrong top-level shape.
    #[error("response to '{command}' should be {expected} but was {found}")]
    UnexpectedShape {
        /// Command whose response was rejected.
        command: &'static str,
        /// Shape the command promises.
        expected: &'static str,
        /// Shape actually received.
        found: &'static str,
    },

    /// The response line was empty where a payload is mandatory.
    #[error("response to '{command}' was empty")]
    EmptyResponse {
        /// Command whose response was empty.
        command: &'static str,
    },

    /// The simulator answered with its own error text.
    #[error("simulator rejected '{command}': {message}")]
    ServerRejected {
        /// Command the simulator rejected.
        command: &'static str,
        /// Error text sent by the simulator.
        message: String,
    },
}

/// A field is present in the payload but holds the wrong JSON type.
#[derive(Debug, Error)]
#[error("field '{field}' in response to '{command}' should be {expected} but was {found}")]
pub struct DecodeError {
    /// Command whose response was being decoded.
    pub command: &'static str,
    /// Object key or array index path (`[2][1]`) of the offending value.
    pub field: String,
    /// Type the decoder expected.
    pub expected: &'static str,
    /// Type actually found.
    pub found: &'static str,
}

/// Errors returned by every public client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket-level failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Response shape mismatch.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Field type mismatch.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An argument could not be encoded on the wire.
    #[error("invalid argument for '{command}': {reason}")]
    InvalidArgument {
        /// Command being encoded.
        command: &'static str,
        /// Why the argument was refused.
        reason: String,
    },
}

impl ClientError {
    /// Returns true for socket-level failures.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns true when a configured timeout elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Connection(error) if error.is_timeout())
    }
}

/// Names the JSON type of a value for error messages.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
