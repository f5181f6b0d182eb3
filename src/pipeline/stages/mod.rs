//! Built-in stages every adapter is wired with
//!
//! 1. InputStage - Reject absent or empty records, trim text
//! 2. TransformStage - Check the record is enrichable and describe the enrichment
//! 3. OutputStage - Render the validated record as a summary line

pub mod input;
pub mod output;
pub mod transform;

pub use input::InputStage;
pub use output::{OutputStage, TemperatureRange, STREAM_SUMMARY};
pub use transform::TransformStage;

use crate::error::{NexusError, NexusResult};
use serde_json::{Map, Number, Value};

/// Numeric `value` of a structured reading, if present and numeric
pub(crate) fn reading_value(map: &Map<String, Value>) -> NexusResult<&Number> {
    match map.get("value") {
        Some(Value::Number(n)) => Ok(n),
        Some(other) => Err(NexusError::invalid_format(format!(
            "reading value {} is not numeric",
            other
        ))),
        None => Err(NexusError::invalid_format("reading has no value")),
    }
}
