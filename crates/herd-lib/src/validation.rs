//! Request validation at the engine boundary
//!
//! Callers hand over loosely typed JSON (form posts, CLI arguments, HTTP
//! bodies). Numbers may arrive as JSON numbers or numeric strings. Every
//! field is required; nothing is filled in on the caller's behalf.

use crate::error::ValidationError;
use crate::models::{DiseaseObservation, QuadrantReading, UdderSensors, YieldObservation};
use serde_json::{Map, Value};

/// Request field names of the eight udder sensors, internal before external
pub const SENSOR_FIELDS: [(&str, &str); 4] = [
    ("front_left_internal", "front_left_external"),
    ("front_right_internal", "front_right_external"),
    ("rear_left_internal", "rear_left_external"),
    ("rear_right_internal", "rear_right_external"),
];

// Canonical name first, then accepted legacy aliases
const FEED: &[&str] = &["feed_kg"];
const YIELD_TEMPERATURE: &[&str] = &["temperature_c", "temp_c"];
const HUMIDITY: &[&str] = &["humidity_pct", "humidity"];
const MILKING_TIME: &[&str] = &["milking_time_min", "milking_time"];
const COW_ID: &[&str] = &["cow_id"];
const DAY: &[&str] = &["day"];
const MONTHS_AFTER_BIRTH: &[&str] = &["months_after_birth"];
const PREVIOUS_MASTITIS: &[&str] = &["previous_mastitis"];
const DISEASE_TEMPERATURE: &[&str] = &["temperature_c", "temperature"];
const BREED: &[&str] = &["breed"];

/// Parse and validate a yield request body
pub fn parse_yield(body: &Value) -> Result<YieldObservation, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;
    let obs = YieldObservation {
        feed_kg: number(obj, FEED)?,
        temperature_c: number(obj, YIELD_TEMPERATURE)?,
        humidity_pct: number(obj, HUMIDITY)?,
        milking_time_min: number(obj, MILKING_TIME)?,
    };
    obs.validate()?;
    Ok(obs)
}

/// Parse and validate a disease request body
pub fn parse_disease(body: &Value) -> Result<DiseaseObservation, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let day = integer(obj, DAY)?;
    if day < 1 {
        return Err(ValidationError::out_of_range(DAY[0], "must be at least 1"));
    }
    let months = integer(obj, MONTHS_AFTER_BIRTH)?;
    if months < 0 {
        return Err(ValidationError::out_of_range(
            MONTHS_AFTER_BIRTH[0],
            "must not be negative",
        ));
    }

    let mut quadrants = [QuadrantReading::new(0.0, 0.0); 4];
    for (quadrant, (internal, external)) in quadrants.iter_mut().zip(SENSOR_FIELDS) {
        *quadrant = QuadrantReading::new(number(obj, &[internal])?, number(obj, &[external])?);
    }
    let [front_left, front_right, rear_left, rear_right] = quadrants;

    let obs = DiseaseObservation {
        cow_id: string(obj, COW_ID)?,
        day: to_u32(DAY[0], day)?,
        months_after_birth: to_u32(MONTHS_AFTER_BIRTH[0], months)?,
        previous_mastitis: boolean(obj, PREVIOUS_MASTITIS)?,
        temperature_c: number(obj, DISEASE_TEMPERATURE)?,
        breed: string(obj, BREED)?,
        sensors: UdderSensors {
            front_left,
            front_right,
            rear_left,
            rear_right,
        },
    };
    obs.validate()?;
    Ok(obs)
}

impl YieldObservation {
    /// Check domain constraints on an already-typed observation
    pub fn validate(&self) -> Result<(), ValidationError> {
        finite(FEED[0], self.feed_kg)?;
        finite(YIELD_TEMPERATURE[0], self.temperature_c)?;
        finite(HUMIDITY[0], self.humidity_pct)?;
        finite(MILKING_TIME[0], self.milking_time_min)?;

        if self.feed_kg < 0.0 {
            return Err(ValidationError::out_of_range(FEED[0], "must not be negative"));
        }
        if !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(ValidationError::out_of_range(
                HUMIDITY[0],
                "must be between 0 and 100",
            ));
        }
        if self.milking_time_min < 0.0 {
            return Err(ValidationError::out_of_range(
                MILKING_TIME[0],
                "must not be negative",
            ));
        }
        Ok(())
    }
}

impl DiseaseObservation {
    /// Check domain constraints on an already-typed observation
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cow_id.trim().is_empty() {
            return Err(ValidationError::out_of_range(COW_ID[0], "must not be empty"));
        }
        if self.day < 1 {
            return Err(ValidationError::out_of_range(DAY[0], "must be at least 1"));
        }
        finite(DISEASE_TEMPERATURE[0], self.temperature_c)?;
        for (quadrant, (internal, external)) in self.sensors.quadrants().iter().zip(SENSOR_FIELDS) {
            finite(internal, quadrant.internal)?;
            finite(external, quadrant.external)?;
        }
        Ok(())
    }
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Result<&'a Value, ValidationError> {
    names
        .iter()
        .find_map(|name| obj.get(*name))
        .ok_or_else(|| ValidationError::MissingField(names[0].to_string()))
}

fn invalid(names: &[&str], expected: &'static str) -> ValidationError {
    ValidationError::InvalidType {
        field: names[0].to_string(),
        expected,
    }
}

fn number(obj: &Map<String, Value>, names: &[&str]) -> Result<f64, ValidationError> {
    let value = match field(obj, names)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(names, "a number"))?;

    if !value.is_finite() {
        return Err(invalid(names, "a finite number"));
    }
    Ok(value)
}

fn integer(obj: &Map<String, Value>, names: &[&str]) -> Result<i64, ValidationError> {
    let value = number(obj, names)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err(invalid(names, "an integer"));
    }
    Ok(value as i64)
}

fn boolean(obj: &Map<String, Value>, names: &[&str]) -> Result<bool, ValidationError> {
    match field(obj, names)? {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(false),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            _ => Err(invalid(names, "a boolean or 0/1")),
        },
        _ => Err(invalid(names, "a boolean or 0/1")),
    }
}

fn string(obj: &Map<String, Value>, names: &[&str]) -> Result<String, ValidationError> {
    match field(obj, names)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(names, "a string")),
    }
}

fn finite(name: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidType {
            field: name.to_string(),
            expected: "a finite number",
        })
    }
}

fn to_u32(name: &str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::out_of_range(name, "too large"))
}
