//! The reactive decision loop.
//!
//! Each period the manager reads the team state and both forward sensors,
//! then climbs away from threats, descends towards targets, and tightens the
//! formation only while a threat sits in the very next cell.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use dartsim_client::{ClientError, Formation, SimulationResults, Simulator, Tactic, TeamState};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ADAPT_TARGET;

/// Lowest altitude level the team can fly at.
pub const MIN_ALTITUDE: i32 = 1;

/// Look-ahead used when none is configured.
pub const DEFAULT_HORIZON: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Everything the manager learned by flying a mission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReport {
    /// Number of steps taken.
    pub steps: u64,
    /// The simulator's rendering of the mission.
    pub screen_output: String,
    /// Final results; `None` if the simulator had none to report.
    pub results: Option<SimulationResults>,
}

/// Flies a mission against any [`Simulator`].
#[derive(Debug, Clone, Copy)]
pub struct AdaptationManager {
    horizon: NonZeroU32,
}

impl Default for AdaptationManager {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON)
    }
}

impl AdaptationManager {
    /// Builds a manager that looks `horizon` cells ahead.
    #[must_use]
    pub const fn new(horizon: NonZeroU32) -> Self {
        Self { horizon }
    }

    /// Cells read ahead by each sensor query.
    #[must_use]
    pub const fn horizon(&self) -> NonZeroU32 {
        self.horizon
    }

    /// Runs the decision loop until the simulator reports the mission is over
    /// or the connection drops, then collects the screen output and results.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] raised by the simulator.
    pub fn run<S: Simulator>(&self, simulator: &mut S) -> Result<MissionReport, ClientError> {
        let params = simulator.parameters()?;
        let max_altitude = params.altitude_levels;
        info!(
            target: ADAPT_TARGET,
            map_size = params.map_size,
            altitude_levels = max_altitude,
            horizon = self.horizon.get(),
            "starting mission"
        );

        let mut steps: u64 = 0;
        while simulator.is_connected() && !simulator.finished()? {
            let started = Instant::now();
            let state = simulator.state()?;
            debug!(
                target: ADAPT_TARGET,
                x = state.position.x,
                y = state.position.y,
                altitude = state.config.altitude_level,
                "current position"
            );
            let threats = simulator.read_forward_threat_sensor(self.horizon.get())?;
            let targets = simulator.read_forward_target_sensor(self.horizon.get())?;

            let tactics = plan_tactics(&state, &threats, &targets, max_altitude);
            let decision_time_ms = millis(started.elapsed());
            if !simulator.step(tactics.iter().copied(), decision_time_ms)? {
                warn!(target: ADAPT_TARGET, ?tactics, "simulator did not accept the step");
            }
            steps = steps.saturating_add(1);
        }

        let screen_output = simulator.screen_output()?;
        let results = simulator.results()?;
        info!(target: ADAPT_TARGET, steps, "mission over");
        Ok(MissionReport {
            steps,
            screen_output,
            results,
        })
    }
}

/// Chooses the tactics for one period.
///
/// A threat anywhere ahead makes the team climb while it can; otherwise a
/// target ahead makes it descend while it can. Independently, a threat in
/// the nearest cell asks for a tight formation and its absence for a loose
/// one. Tactics already in effect are not repeated.
#[must_use]
pub fn plan_tactics(
    state: &TeamState,
    threats: &[bool],
    targets: &[bool],
    max_altitude: i32,
) -> Vec<Tactic> {
    let altitude = state.config.altitude_level;
    let mut tactics = Vec::new();

    if threats.contains(&true) && altitude < max_altitude {
        tactics.push(Tactic::IncAlt);
    } else if targets.contains(&true) && altitude > MIN_ALTITUDE {
        tactics.push(Tactic::DecAlt);
    }

    let immediate_threat = threats.first().copied().unwrap_or(false);
    match (immediate_threat, state.config.formation) {
        (true, Formation::Loose) => tactics.push(Tactic::GoTight),
        (false, Formation::Tight) => tactics.push(Tactic::GoLoose),
        (true, Formation::Tight) | (false, Formation::Loose) => {}
    }
    tactics
}

#[expect(
    clippy::float_arithmetic,
    reason = "the simulator records decision time in fractional milliseconds"
)]
fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
