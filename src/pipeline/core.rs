use crate::error::NexusResult;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Position a stage occupies in an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageRole {
    Input,
    Transform,
    Output,
}

impl StageRole {
    /// Required order of stages in every adapter
    pub const ORDER: [StageRole; 3] = [StageRole::Input, StageRole::Transform, StageRole::Output];

    /// 1-based stage number used in reports
    pub fn number(&self) -> usize {
        match self {
            StageRole::Input => 1,
            StageRole::Transform => 2,
            StageRole::Output => 3,
        }
    }

    /// Context key the stage reads from
    pub fn input_key(&self) -> &'static str {
        match self {
            StageRole::Input => "input",
            StageRole::Transform | StageRole::Output => "validated",
        }
    }

    /// Context key the stage writes to
    pub fn output_key(&self) -> &'static str {
        match self {
            StageRole::Input => "validated",
            StageRole::Transform => "enrichment",
            StageRole::Output => "rendered",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageRole::Input => "Input",
            StageRole::Transform => "Transform",
            StageRole::Output => "Output",
        };
        f.write_str(name)
    }
}

/// A single stage in an adapter
///
/// Stages are stateless: `process` maps one record to the next without
/// touching anything else. Rejections are reported as
/// `NexusError::InvalidFormat`.
///
/// # Example
/// ```
/// use nexus_lib::error::{NexusError, NexusResult};
/// use nexus_lib::pipeline::{PipelineStage, StageRole};
/// use nexus_lib::record::Record;
///
/// struct Uppercase;
///
/// impl PipelineStage for Uppercase {
///     fn process(&self, data: &Record) -> NexusResult<Record> {
///         data.as_str()
///             .map(|s| Record::String(s.to_uppercase()))
///             .ok_or_else(|| NexusError::invalid_format("expected text"))
///     }
///
///     fn name(&self) -> &str {
///         "Uppercase"
///     }
///
///     fn description(&self) -> &str {
///         "Uppercase normalization"
///     }
///
///     fn role(&self) -> StageRole {
///         StageRole::Input
///     }
/// }
/// ```
pub trait PipelineStage: Send + Sync {
    /// Process one record
    fn process(&self, data: &Record) -> NexusResult<Record>;

    /// Short stage name for logging
    fn name(&self) -> &str;

    /// Human-readable description shown in the stage overview
    fn description(&self) -> &str;

    /// Where this stage belongs in an adapter
    fn role(&self) -> StageRole;
}

/// Result of a pipeline stage execution
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage_name: String,
    pub role: StageRole,
    pub success: bool,
    pub error: Option<String>,
    pub duration: Duration,
}

impl StageResult {
    pub fn success(stage_name: impl Into<String>, role: StageRole, duration: Duration) -> Self {
        Self {
            stage_name: stage_name.into(),
            role,
            success: true,
            error: None,
            duration,
        }
    }

    pub fn failure(
        stage_name: impl Into<String>,
        role: StageRole,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            role,
            success: false,
            error: Some(error.into()),
            duration,
        }
    }
}

/// Result of running one record through an adapter
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pipeline_name: String,
    pub success: bool,
    pub stage_results: Vec<StageResult>,
    pub total_duration: Duration,
    pub error: Option<String>,

    /// Descriptor returned by the transform stage
    pub enrichment: Option<String>,

    /// Final message with the adapter prefix applied
    pub output: Option<String>,
}

impl PipelineResult {
    pub fn success(
        pipeline_name: impl Into<String>,
        stage_results: Vec<StageResult>,
        total_duration: Duration,
        enrichment: String,
        output: String,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            success: true,
            stage_results,
            total_duration,
            error: None,
            enrichment: Some(enrichment),
            output: Some(output),
        }
    }

    pub fn failure(
        pipeline_name: impl Into<String>,
        stage_results: Vec<StageResult>,
        error: impl Into<String>,
        total_duration: Duration,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            success: false,
            stage_results,
            total_duration,
            error: Some(error.into()),
            enrichment: None,
            output: None,
        }
    }

    /// Number of stages that ran, including a failing one
    pub fn executed_stages(&self) -> usize {
        self.stage_results.len()
    }

    /// The stage that failed (if any)
    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_role_order_and_numbers() {
        let numbers: Vec<usize> = StageRole::ORDER.iter().map(|r| r.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_transform_and_output_read_validated_data() {
        assert_eq!(StageRole::Input.input_key(), "input");
        assert_eq!(StageRole::Transform.input_key(), StageRole::Input.output_key());
        assert_eq!(StageRole::Output.input_key(), StageRole::Input.output_key());
    }

    #[test]
    fn test_stage_result_failure() {
        let result = StageResult::failure(
            "Transform",
            StageRole::Transform,
            "missing value",
            Duration::from_millis(1),
        );
        assert!(!result.success);
        assert_eq!(result.error, Some("missing value".to_string()));
        assert_eq!(result.role, StageRole::Transform);
    }

    #[test]
    fn test_pipeline_result_success() {
        let stage_results = vec![
            StageResult::success("Input", StageRole::Input, Duration::from_millis(1)),
            StageResult::success("Transform", StageRole::Transform, Duration::from_millis(1)),
            StageResult::success("Output", StageRole::Output, Duration::from_millis(1)),
        ];
        let result = PipelineResult::success(
            "Pipeline A",
            stage_results,
            Duration::from_millis(3),
            "Enriched".to_string(),
            "done".to_string(),
        );

        assert!(result.success);
        assert_eq!(result.executed_stages(), 3);
        assert!(result.failed_stage().is_none());
        assert_eq!(result.output.as_deref(), Some("done"));
    }

    #[test]
    fn test_pipeline_result_failure() {
        let stage_results = vec![
            StageResult::success("Input", StageRole::Input, Duration::from_millis(1)),
            StageResult::failure("Transform", StageRole::Transform, "Failed", Duration::from_millis(1)),
        ];
        let result =
            PipelineResult::failure("Pipeline A", stage_results, "Failed", Duration::from_millis(2));

        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.failed_stage().unwrap().role, StageRole::Transform);
    }
}
