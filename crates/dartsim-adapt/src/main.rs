//! Entry point for the example DARTSim adaptation manager.
//!
//! The binary delegates to [`dartsim_adapt::run`], which parses arguments,
//! connects to the simulator, flies the mission, and reports the results.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    dartsim_adapt::run(std::env::args_os(), &mut stdout, &mut stderr)
}
