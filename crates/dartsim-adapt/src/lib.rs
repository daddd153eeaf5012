//! Example adaptation manager for the DARTSim mission simulator.
//!
//! The manager connects to a running simulator, reads the team state and the
//! forward sensors every period, picks altitude and formation tactics, and
//! steps the simulation until the mission is over. It then prints the
//! simulator's screen output and the mission results.
//!
//! [`run`] is the whole program; the binary only wires it to the process's
//! arguments and standard streams.

mod cli;
mod errors;
mod manager;
mod output;
pub mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use dartsim_client::DartSimClient;

pub use cli::{Cli, OutputFormat};
use errors::AppError;
pub use manager::{AdaptationManager, DEFAULT_HORIZON, MIN_ALTITUDE, MissionReport, plan_tactics};

/// Tracing target for events emitted by the manager.
pub(crate) const ADAPT_TARGET: &str = "dartsim_adapt";

/// Runs the manager with the provided arguments and output streams.
///
/// Returns success once the mission report has been written, and failure if
/// the arguments are invalid or the simulator session breaks.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    match run_mission(args, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn run_mission<I, W>(args: I, stdout: &mut W) -> Result<(), AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    let cli = Cli::try_parse_from(args).map_err(AppError::CliUsage)?;
    let config = cli.client_config();
    telemetry::initialise(&config)?;

    let mut client = DartSimClient::new(&config);
    client.connect()?;
    let outcome = AdaptationManager::new(cli.horizon).run(&mut client);
    client.close();

    output::render(&outcome?, cli.output, stdout)
}

#[cfg(test)]
mod tests;
