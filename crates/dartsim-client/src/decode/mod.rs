//! Pure mappings from a response line to a typed value.
//!
//! Each decoder receives the line the dispatcher returned, with its
//! terminator already stripped, and either produces the typed result for the
//! command or explains why it cannot. Missing object keys keep the documented
//! default; keys that are present with the wrong JSON type are reported as a
//! [`DecodeError`](crate::DecodeError) naming the key.

mod fields;


use serde_json::Value;
use tracing::warn;

use self::fields::Fields;
use crate::CLIENT_TARGET;
use crate::dispatch::SERVER_ERROR_PREFIX;
use crate::error::{ClientError, DecodeError, ProtocolError, json_kind};
use crate::model::{
    Coordinate, DownwardLookingSensorParams, Formation, LongRangeSensorParams,
    SensorObservations, SensorReading, SimulationParameters, SimulationResults, TeamConfiguration,
    TeamState, ThreatParams,
};

/// Decodes the literal `true`/`false` reply of `finished` and `step`.
///
/// Exactly `true` is true. Any other text is false; text that is not the
/// literal `false` is logged because it usually means a desynchronised
/// stream.
///
/// # Errors
///
/// Returns [`ProtocolError::ServerRejected`] when the simulator answered with
/// an `error:` line.
pub fn flag(command: &'static str, line: &str) -> Result<bool, ClientError> {
    reject_server_error(command, line)?;
    match line {
        "true" => Ok(true),
        "false" => Ok(false),
        other => {
            warn!(
                target: CLIENT_TARGET,
                command,
                response = other,
                "non-boolean response treated as false"
            );
            Ok(false)
        }
    }
}

/// Decodes the `getState` object.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is not a JSON object and a
/// [`DecodeError`] when a present key has the wrong type.
pub fn team_state(line: &str) -> Result<TeamState, ClientError> {
    const COMMAND: &str = "getState";
    let value = parse(COMMAND, line)?;
    let fields = Fields::of(COMMAND, &value)?;

    Ok(TeamState {
        position: Coordinate::new(
            fields.int("positionX")?.unwrap_or(Coordinate::UNSET.x),
            fields.int("positionY")?.unwrap_or(Coordinate::UNSET.y),
        ),
        direction_x: fields.int("directionX")?.unwrap_or_default(),
        direction_y: fields.int("directionY")?.unwrap_or_default(),
        config: TeamConfiguration {
            altitude_level: fields.int("altitudeLevel")?.unwrap_or_default(),
            formation: fields
                .int("formation")?
                .map_or(Formation::default(), Formation::from_wire),
            ecm: fields.boolean("ecm")?.unwrap_or_default(),
            ttc_inc_alt: fields.int("ttcIncAlt")?.unwrap_or_default(),
            ttc_dec_alt: fields.int("ttcDecAlt")?.unwrap_or_default(),
            ttc_inc_alt2: fields.int("ttcIncAlt2")?.unwrap_or_default(),
            ttc_dec_alt2: fields.int("ttcDecAlt2")?.unwrap_or_default(),
        },
    })
}

/// Decodes a single forward-sensor observation.
///
/// The length of the array is not checked against the requested cell count.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is not a JSON array and a
/// [`DecodeError`] naming the index of the first non-boolean element.
pub fn sensor_reading(command: &'static str, line: &str) -> Result<SensorReading, ClientError> {
    let value = parse(command, line)?;
    let cells = expect_array(command, &value)?;
    booleans(command, cells, "").map_err(ClientError::from)
}

/// Decodes several forward-sensor observations, preserving both orders.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is not a JSON array and a
/// [`DecodeError`] with an index path such as `[2][1]` for the first
/// malformed element.
pub fn sensor_observations(
    command: &'static str,
    line: &str,
) -> Result<SensorObservations, ClientError> {
    let value = parse(command, line)?;
    let rows = expect_array(command, &value)?;
    rows.iter()
        .enumerate()
        .map(|(row, observation)| match observation {
            Value::Array(cells) => {
                booleans(command, cells, &format!("[{row}]")).map_err(ClientError::from)
            }
            other => Err(DecodeError {
                command,
                field: format!("[{row}]"),
                expected: "an array of booleans",
                found: json_kind(other),
            }
            .into()),
        })
        .collect()
}

/// Decodes the `getResults` object.
///
/// An empty line or a JSON `null` means the simulator has no results yet and
/// yields `Ok(None)`.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is neither empty nor a JSON
/// object and a [`DecodeError`] when a present key has the wrong type.
pub fn results(line: &str) -> Result<Option<SimulationResults>, ClientError> {
    const COMMAND: &str = "getResults";
    if line.trim().is_empty() {
        return Ok(None);
    }
    let value = parse(COMMAND, line)?;
    if value.is_null() {
        return Ok(None);
    }
    let fields = Fields::of(COMMAND, &value)?;

    // Older simulator builds only send the X coordinate of the wreck.
    let destroyed_x = fields.int("destruction positionX")?;
    let destroyed_y = fields.int("destruction positionY")?.or(destroyed_x);
    Ok(Some(SimulationResults {
        destroyed: fields.boolean("destroyed")?.unwrap_or_default(),
        where_destroyed: Coordinate::new(
            destroyed_x.unwrap_or(Coordinate::UNSET.x),
            destroyed_y.unwrap_or(Coordinate::UNSET.y),
        ),
        targets_detected: fields.int("targetsDetected")?.unwrap_or_default(),
        mission_success: fields.boolean("missionSuccess")?.unwrap_or_default(),
        decision_time_avg: fields.float("decisionTimeAvg")?.unwrap_or_default(),
        decision_time_var: fields.float("decisionTimeVar")?.unwrap_or_default(),
    }))
}

/// Decodes the JSON string returned by `getScreenOutput` into plain text.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is not a JSON string.
pub fn screen_output(line: &str) -> Result<String, ClientError> {
    const COMMAND: &str = "getScreenOutput";
    match parse(COMMAND, line)? {
        Value::String(text) => Ok(text),
        other => Err(ProtocolError::UnexpectedShape {
            command: COMMAND,
            expected: "a string",
            found: json_kind(&other),
        }
        .into()),
    }
}

/// Decodes the flat `getParameters` object into grouped parameters.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the line is not a JSON object and a
/// [`DecodeError`] when a present key has the wrong type.
pub fn parameters(line: &str) -> Result<SimulationParameters, ClientError> {
    const COMMAND: &str = "getParameters";
    let value = parse(COMMAND, line)?;
    let fields = Fields::of(COMMAND, &value)?;
    let defaults = SimulationParameters::DEFAULT;
    let long_range = defaults.long_range_sensor;
    let downward = defaults.downward_looking_sensor;

    Ok(SimulationParameters {
        map_size: fields.int("mapSize")?.unwrap_or(defaults.map_size),
        square_map: fields.boolean("squareMap")?.unwrap_or(defaults.square_map),
        altitude_levels: fields
            .int("altitudeLevels")?
            .unwrap_or(defaults.altitude_levels),
        change_altitude_latency_periods: fields
            .int("changeAltitudeLatencyPeriods")?
            .unwrap_or(defaults.change_altitude_latency_periods),
        optimality_test: fields
            .boolean("optimalityTest")?
            .unwrap_or(defaults.optimality_test),
        long_range_sensor: LongRangeSensorParams {
            threat_sensor_fpr: fields
                .float("threatSensorFPR")?
                .unwrap_or(long_range.threat_sensor_fpr),
            threat_sensor_fnr: fields
                .float("threatSensorFNR")?
                .unwrap_or(long_range.threat_sensor_fnr),
            target_sensor_fpr: fields
                .float("targetSensorFPR")?
                .unwrap_or(long_range.target_sensor_fpr),
            target_sensor_fnr: fields
                .float("targetSensorFNR")?
                .unwrap_or(long_range.target_sensor_fnr),
        },
        downward_looking_sensor: DownwardLookingSensorParams {
            target_detection_formation_factor: fields
                .float("targetDetectionFormationFactor")?
                .unwrap_or(downward.target_detection_formation_factor),
            target_sensor_range: fields
                .int("targetSensorRange")?
                .unwrap_or(downward.target_sensor_range),
        },
        threat: ThreatParams {
            destruction_formation_factor: fields
                .float("destructionFormationFactor")?
                .unwrap_or(defaults.threat.destruction_formation_factor),
            threat_range: fields
                .int("threatRange")?
                .unwrap_or(defaults.threat.threat_range),
        },
    })
}

fn reject_server_error(command: &'static str, line: &str) -> Result<(), ProtocolError> {
    match line.strip_prefix(SERVER_ERROR_PREFIX) {
        Some(message) => Err(ProtocolError::ServerRejected {
            command,
            message: message.trim().to_owned(),
        }),
        None => Ok(()),
    }
}

fn parse(command: &'static str, line: &str) -> Result<Value, ProtocolError> {
    if line.trim().is_empty() {
        return Err(ProtocolError::EmptyResponse { command });
    }
    reject_server_error(command, line)?;
    serde_json::from_str(line).map_err(|source| ProtocolError::InvalidJson { command, source })
}

fn expect_array<'a>(command: &'static str, value: &'a Value) -> Result<&'a [Value], ProtocolError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ProtocolError::UnexpectedShape {
            command,
            expected: "an array",
            found: json_kind(other),
        }),
    }
}

fn booleans(command: &'static str, cells: &[Value], prefix: &str) -> Result<Vec<bool>, DecodeError> {
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            cell.as_bool().ok_or_else(|| DecodeError {
                command,
                field: format!("{prefix}[{index}]"),
                expected: "a boolean",
                found: json_kind(cell),
            })
        })
        .collect()
}
