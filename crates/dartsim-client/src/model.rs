//! Typed snapshots decoded from simulator responses.
//!
//! Every value here is built fresh by a decoder and handed to the caller. None
//! of them refer back to the client, so they can be kept, cloned, or
//! serialised freely after the connection has gone away.

use serde::{Deserialize, Serialize};

/// Position on the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coordinate {
    /// Sentinel meaning "no position reported".
    pub const UNSET: Self = Self {
        x: i32::MAX,
        y: i32::MAX,
    };

    /// Builds a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true for the [`Coordinate::UNSET`] sentinel.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.x == i32::MAX && self.y == i32::MAX
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Spacing of the team while flying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formation {
    /// Spread out; wire value `0`.
    #[default]
    Loose,
    /// Close together; any non-zero wire value.
    Tight,
}

impl Formation {
    /// Maps the wire integer: `0` is loose, everything else is tight.
    #[must_use]
    pub const fn from_wire(value: i32) -> Self {
        if value == 0 { Self::Loose } else { Self::Tight }
    }

    /// Integer the simulator uses for this formation.
    #[must_use]
    pub const fn to_wire(self) -> i32 {
        match self {
            Self::Loose => 0,
            Self::Tight => 1,
        }
    }
}

/// Altitude, formation and countermeasure settings of the team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamConfiguration {
    /// Current altitude level, starting at 1.
    pub altitude_level: i32,
    /// Current formation.
    pub formation: Formation,
    /// Whether electronic countermeasures are on.
    pub ecm: bool,
    /// Periods left until an `IncAlt` completes.
    pub ttc_inc_alt: i32,
    /// Periods left until a `DecAlt` completes.
    pub ttc_dec_alt: i32,
    /// Periods left until an `IncAlt2` completes.
    pub ttc_inc_alt2: i32,
    /// Periods left until a `DecAlt2` completes.
    pub ttc_dec_alt2: i32,
}

/// Snapshot of the team returned by `getState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    /// Current grid position; [`Coordinate::UNSET`] when not reported.
    pub position: Coordinate,
    /// Horizontal direction of travel (-1, 0 or +1).
    pub direction_x: i32,
    /// Vertical direction of travel (-1, 0 or +1).
    pub direction_y: i32,
    /// Team configuration.
    pub config: TeamConfiguration,
}

/// Error rates of the long-range forward-looking sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRangeSensorParams {
    /// False positive rate of the threat sensor.
    pub threat_sensor_fpr: f64,
    /// False negative rate of the threat sensor.
    pub threat_sensor_fnr: f64,
    /// False positive rate of the target sensor.
    pub target_sensor_fpr: f64,
    /// False negative rate of the target sensor.
    pub target_sensor_fnr: f64,
}

impl LongRangeSensorParams {
    /// Simulator defaults.
    pub const DEFAULT: Self = Self {
        threat_sensor_fpr: 0.10,
        threat_sensor_fnr: 0.15,
        target_sensor_fpr: 0.10,
        target_sensor_fnr: 0.15,
    };
}

impl Default for LongRangeSensorParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters of the short-range downward-looking target sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownwardLookingSensorParams {
    /// Detection factor applied when flying tight.
    pub target_detection_formation_factor: f64,
    /// Sensor range in altitude levels.
    pub target_sensor_range: i32,
}

impl DownwardLookingSensorParams {
    /// Simulator defaults.
    pub const DEFAULT: Self = Self {
        target_detection_formation_factor: 1.2,
        target_sensor_range: 4,
    };
}

impl Default for DownwardLookingSensorParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters of the threats on the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatParams {
    /// Destruction factor applied when flying loose.
    pub destruction_formation_factor: f64,
    /// Threat range in altitude levels.
    pub threat_range: i32,
}

impl ThreatParams {
    /// Simulator defaults.
    pub const DEFAULT: Self = Self {
        destruction_formation_factor: 1.5,
        threat_range: 3,
    };
}

impl Default for ThreatParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration snapshot returned by `getParameters`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Number of cells along the route.
    pub map_size: i32,
    /// Whether the map is a square rather than a single route.
    pub square_map: bool,
    /// Number of altitude levels.
    pub altitude_levels: i32,
    /// Periods an altitude change takes to complete.
    pub change_altitude_latency_periods: i32,
    /// Whether the simulator runs in optimality test mode.
    pub optimality_test: bool,
    /// Long-range sensor error rates.
    pub long_range_sensor: LongRangeSensorParams,
    /// Downward-looking sensor parameters.
    pub downward_looking_sensor: DownwardLookingSensorParams,
    /// Threat parameters.
    pub threat: ThreatParams,
}

impl SimulationParameters {
    /// Simulator defaults.
    pub const DEFAULT: Self = Self {
        map_size: 40,
        square_map: false,
        altitude_levels: 4,
        change_altitude_latency_periods: 1,
        optimality_test: false,
        long_range_sensor: LongRangeSensorParams::DEFAULT,
        downward_looking_sensor: DownwardLookingSensorParams::DEFAULT,
        threat: ThreatParams::DEFAULT,
    };
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mission summary returned by `getResults` once the simulation finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    /// Whether the team was destroyed.
    pub destroyed: bool,
    /// Where the team was destroyed; [`Coordinate::UNSET`] otherwise.
    pub where_destroyed: Coordinate,
    /// Number of targets detected.
    pub targets_detected: i32,
    /// Whether the mission met its goal.
    pub mission_success: bool,
    /// Mean decision time in milliseconds (`-1` when undefined).
    pub decision_time_avg: f64,
    /// Variance of the decision time (`-1` when undefined).
    pub decision_time_var: f64,
}

impl Default for SimulationResults {
    fn default() -> Self {
        Self {
            destroyed: false,
            where_destroyed: Coordinate::UNSET,
            targets_detected: 0,
            mission_success: false,
            decision_time_avg: 0.0,
            decision_time_var: 0.0,
        }
    }
}

/// One forward-sensor observation, indexed by distance ahead of the team.
pub type SensorReading = Vec<bool>;

/// Several consecutive observations of the same cells.
pub type SensorObservations = Vec<SensorReading>;
