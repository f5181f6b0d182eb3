use super::reading_value;
use crate::error::{NexusError, NexusResult};
use crate::pipeline::{PipelineStage, StageRole};
use crate::record::Record;
use serde_json::Value;

/// Stage that validates and normalizes raw records
///
/// - Null is rejected.
/// - Text is trimmed; blank text is rejected.
/// - Objects must not be empty. The strict variant also requires a `sensor`
///   key and a numeric `value`.
/// - Any other value passes through untouched.
pub struct InputStage {
    strict: bool,
}

impl InputStage {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Variant that enforces the reading schema up front
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for InputStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for InputStage {
    fn process(&self, data: &Record) -> NexusResult<Record> {
        match data {
            Value::Null => Err(NexusError::invalid_format("None received")),
            Value::String(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(NexusError::invalid_format("Empty string"));
                }
                Ok(Value::String(trimmed.to_string()))
            }
            Value::Object(map) => {
                if map.is_empty() {
                    return Err(NexusError::invalid_format("Empty dictionary"));
                }
                if self.strict {
                    if !map.contains_key("sensor") {
                        return Err(NexusError::invalid_format("reading has no sensor"));
                    }
                    reading_value(map)?;
                }
                Ok(data.clone())
            }
            other => Ok(other.clone()),
        }
    }

    fn name(&self) -> &str {
        "Input"
    }

    fn description(&self) -> &str {
        "Input validation and parsing"
    }

    fn role(&self) -> StageRole {
        StageRole::Input
    }
}
