//! Failures that end a run.

use std::io;

use dartsim_client::ClientError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("simulator session failed: {0}")]
    Client(#[from] ClientError),
    #[error("failed to serialise mission report: {0}")]
    SerialiseReport(serde_json::Error),
    #[error("failed to write mission report: {0}")]
    WriteReport(io::Error),
}
