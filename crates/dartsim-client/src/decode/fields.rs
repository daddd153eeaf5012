//! Typed accessors over a decoded JSON object.
//!
//! Each accessor distinguishes an absent key (or explicit `null`), which
//! yields `Ok(None)`, from a present value of the wrong type, which yields a
//! [`DecodeError`] naming the key.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::CLIENT_TARGET;
use crate::error::{DecodeError, ProtocolError, json_kind};

pub(super) struct Fields<'a> {
    command: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(super) fn of(command: &'static str, value: &'a Value) -> Result<Self, ProtocolError> {
        match value {
            Value::Object(object) => Ok(Self { command, object }),
            other => Err(ProtocolError::UnexpectedShape {
                command,
                expected: "an object",
                found: json_kind(other),
            }),
        }
    }

    pub(super) fn int(&self, key: &str) -> Result<Option<i32>, DecodeError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        match value {
            Value::Number(number) => number
                .as_i64()
                .and_then(|wide| i32::try_from(wide).ok())
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "a 32-bit integer", describe_number(number))),
            other => Err(self.mismatch(key, "a 32-bit integer", json_kind(other))),
        }
    }

    pub(super) fn float(&self, key: &str) -> Result<Option<f64>, DecodeError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "a number", describe_number(number))),
            other => Err(self.mismatch(key, "a number", json_kind(other))),
        }
    }

    pub(super) fn boolean(&self, key: &str) -> Result<Option<bool>, DecodeError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        match value {
            Value::Bool(flag) => Ok(Some(*flag)),
            other => Err(self.mismatch(key, "a boolean", json_kind(other))),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        let value = self.object.get(key).filter(|value| !value.is_null());
        if value.is_none() {
            debug!(
                target: CLIENT_TARGET,
                command = self.command,
                field = key,
                "field absent from response; keeping default"
            );
        }
        value
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &'static str) -> DecodeError {
        DecodeError {
            command: self.command,
            field: key.to_owned(),
            expected,
            found,
        }
    }
}

fn describe_number(number: &Number) -> &'static str {
    if number.is_f64() {
        "a fractional number"
    } else {
        "an out-of-range integer"
    }
}
