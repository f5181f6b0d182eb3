use crate::error::{NexusError, NexusResult};
use crate::record::Record;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Per-call store that carries a record between stages
///
/// Each stage reads the key its role consumes and writes the key it
/// produces, so the transform and output stages both see the validated input.
///
/// # Example
/// ```
/// use nexus_lib::pipeline::PipelineContext;
/// use serde_json::json;
///
/// let mut context = PipelineContext::new(json!("user,action,timestamp"));
/// context.set_string("enrichment", "Parsed and structured data");
///
/// assert!(context.has("input"));
/// assert_eq!(context.get_string("enrichment").unwrap(), "Parsed and structured data");
/// ```
#[derive(Debug, Clone)]
pub struct PipelineContext {
    call_id: Uuid,
    data: HashMap<String, Value>,
    metadata: HashMap<String, String>,
}

impl PipelineContext {
    /// Create a context seeded with the raw record under `input`
    pub fn new(record: Record) -> Self {
        Self::with_call_id(Uuid::new_v4(), record)
    }

    pub fn with_call_id(call_id: Uuid, record: Record) -> Self {
        let mut data = HashMap::new();
        data.insert("input".to_string(), record);
        Self {
            call_id,
            data,
            metadata: HashMap::new(),
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a value or fail with a wiring error
    pub fn get_required(&self, key: &str) -> NexusResult<&Value> {
        self.data.get(key).ok_or_else(|| {
            NexusError::ConfigError(format!("Required context key not found: {}", key))
        })
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), Value::String(value.into()));
    }

    pub fn get_string(&self, key: &str) -> NexusResult<String> {
        match self.get_required(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(NexusError::invalid_format(format!(
                "context key '{}' holds {} instead of text",
                key, other
            ))),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }
}
