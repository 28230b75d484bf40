//! Typed access to decision input payloads.
//!
//! Inputs arrive as arbitrary JSON. Models read their fields through
//! [`InputReader`], which turns missing, ill-typed, or out-of-range values into
//! `EngineError::Validation` instead of panicking.

use serde_json::{Map, Value};

use crate::error::EngineError;

/// Inclusive bounds for a numeric field.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Reject values equal to `min`.
    pub exclusive_min: bool,
}

impl Bounds {
    pub const NON_NEGATIVE: Self = Self {
        min: Some(0.0),
        max: None,
        exclusive_min: false,
    };

    pub const POSITIVE: Self = Self {
        min: Some(0.0),
        max: None,
        exclusive_min: true,
    };

    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            exclusive_min: false,
        }
    }

    fn check(self, field: &str, value: f64) -> Result<f64, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::Validation(format!("{field} must be a finite number")));
        }
        if let Some(min) = self.min {
            if value < min || (self.exclusive_min && value <= min) {
                let op = if self.exclusive_min { ">" } else { ">=" };
                return Err(EngineError::Validation(format!(
                    "{field} must be {op} {min}, got {value}"
                )));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(EngineError::Validation(format!(
                    "{field} must be <= {max}, got {value}"
                )));
            }
        }
        Ok(value)
    }
}

/// Borrowed view over a JSON object payload.
pub struct InputReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> InputReader<'a> {
    /// # Errors
    ///
    /// Returns `EngineError::Validation` when `input` is not a JSON object.
    pub fn new(input: &'a Value) -> Result<Self, EngineError> {
        input
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| EngineError::Validation("input must be a JSON object".into()))
    }

    #[must_use]
    pub fn raw(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// # Errors
    ///
    /// Returns `EngineError::Validation` when the field is absent, not numeric,
    /// or outside `bounds`.
    pub fn required_f64(&self, field: &str, bounds: Bounds) -> Result<f64, EngineError> {
        let value = self
            .raw(field)
            .ok_or_else(|| EngineError::Validation(format!("missing required field '{field}'")))?;
        bounds.check(field, as_number(field, value)?)
    }

    /// # Errors
    ///
    /// Returns `EngineError::Validation` when the field is present but not
    /// numeric or outside `bounds`.
    pub fn optional_f64(&self, field: &str, default: f64, bounds: Bounds) -> Result<f64, EngineError> {
        match self.raw(field) {
            Some(value) => bounds.check(field, as_number(field, value)?),
            None => Ok(default),
        }
    }

    /// # Errors
    ///
    /// Returns `EngineError::Validation` when the field is present but not a boolean.
    pub fn optional_bool(&self, field: &str, default: bool) -> Result<bool, EngineError> {
        match self.raw(field) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(EngineError::Validation(format!("{field} must be a boolean"))),
            None => Ok(default),
        }
    }
}

/// Accept JSON numbers and numeric strings (form posts send strings).
fn as_number(field: &str, value: &Value) -> Result<f64, EngineError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| EngineError::Validation(format!("{field} is not representable"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EngineError::Validation(format!("{field} must be a number, got '{s}'"))),
        _ => Err(EngineError::Validation(format!("{field} must be a number"))),
    }
}
