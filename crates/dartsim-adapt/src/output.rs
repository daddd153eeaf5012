//! Rendering of the mission report.

use std::io::{self, Write};

use dartsim_client::SimulationResults;

use crate::cli::OutputFormat;
use crate::errors::AppError;
use crate::manager::MissionReport;

/// Writes `report` to `stdout` in the requested format.
pub(crate) fn render<W: Write>(
    report: &MissionReport,
    format: OutputFormat,
    stdout: &mut W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Human => render_human(report, stdout).map_err(AppError::WriteReport),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *stdout, report).map_err(AppError::SerialiseReport)?;
            writeln!(stdout).map_err(AppError::WriteReport)
        }
    }
}

fn render_human<W: Write>(report: &MissionReport, stdout: &mut W) -> io::Result<()> {
    write!(stdout, "{}", report.screen_output)?;
    if !report.screen_output.is_empty() && !report.screen_output.ends_with('\n') {
        writeln!(stdout)?;
    }
    writeln!(stdout, "Steps taken: {}", report.steps)?;
    match &report.results {
        Some(results) => render_results(results, stdout),
        None => writeln!(stdout, "No results available"),
    }
}

fn render_results<W: Write>(results: &SimulationResults, stdout: &mut W) -> io::Result<()> {
    writeln!(stdout, "Destroyed: {}", results.destroyed)?;
    if results.destroyed && !results.where_destroyed.is_unset() {
        writeln!(
            stdout,
            "Destroyed at: ({}, {})",
            results.where_destroyed.x, results.where_destroyed.y
        )?;
    }
    writeln!(stdout, "Targets detected: {}", results.targets_detected)?;
    writeln!(stdout, "Mission success: {}", results.mission_success)?;
    writeln!(
        stdout,
        "Decision time: avg {} ms, var {}",
        results.decision_time_avg, results.decision_time_var
    )
}
