use super::reading_value;
use crate::error::{NexusError, NexusResult};
use crate::pipeline::{PipelineStage, StageRole};
use crate::record::{delimiter_count, mentions_stream, Record, MIN_DELIMITERS};
use serde_json::Value;

pub const ENRICHED: &str = "Enriched with metadata and validation";
pub const PARSED: &str = "Parsed and structured data";
pub const AGGREGATED: &str = "Aggregated and filtered";

/// Stage that checks a record can be enriched and says how
///
/// Returns a descriptor string rather than a modified record. Adapters log
/// the descriptor and render the validated record, not this output.
pub struct TransformStage;

impl TransformStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransformStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for TransformStage {
    fn process(&self, data: &Record) -> NexusResult<Record> {
        let descriptor = match data {
            Value::Object(map) => {
                if !map.contains_key("sensor") {
                    return Err(NexusError::invalid_format("reading has no sensor"));
                }
                reading_value(map)?;
                ENRICHED
            }
            Value::String(text) if delimiter_count(text) >= MIN_DELIMITERS => PARSED,
            Value::String(text) if mentions_stream(text) => AGGREGATED,
            Value::String(_) => {
                return Err(NexusError::invalid_format(
                    "text is neither delimited nor a stream summary",
                ))
            }
            other => {
                return Err(NexusError::invalid_format(format!(
                    "cannot transform {}",
                    other
                )))
            }
        };
        Ok(Value::String(descriptor.to_string()))
    }

    fn name(&self) -> &str {
        "Transform"
    }

    fn description(&self) -> &str {
        "Data transformation and enrichment"
    }

    fn role(&self) -> StageRole {
        StageRole::Transform
    }
}
