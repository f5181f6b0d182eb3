use super::context::PipelineContext;
use super::core::{PipelineResult, PipelineStage, StageResult, StageRole};
use super::stages::{InputStage, OutputStage, TransformStage};
use crate::error::{NexusError, NexusResult};
use crate::events::{EventEmitter, EventSink};
use crate::logger::LogLevel;
use crate::nexus_log;
use crate::record::{AdapterKind, Record};
use std::time::Instant;
use uuid::Uuid;

/// Number of stages every adapter must carry
pub const STAGE_COUNT: usize = 3;

/// A format-specific pipeline: three ordered stages plus a render prefix
///
/// # Example
/// ```
/// use nexus_lib::pipeline::Adapter;
/// use nexus_lib::record::AdapterKind;
/// use serde_json::json;
///
/// let adapter = Adapter::standard(AdapterKind::Delimited, "Pipeline B");
/// let result = adapter.execute(&json!("user,action,timestamp")).unwrap();
///
/// assert_eq!(result.output.as_deref(), Some("User activity logged: 1 actions processed"));
/// ```
pub struct Adapter {
    id: String,
    kind: AdapterKind,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl Adapter {
    pub fn builder(kind: AdapterKind, id: impl Into<String>) -> AdapterBuilder {
        AdapterBuilder::new(kind, id)
    }

    /// Adapter wired with the built-in Input, Transform and Output stages
    pub fn standard(kind: AdapterKind, id: impl Into<String>) -> Self {
        Self::builder(kind, id)
            .add_stage(InputStage::new())
            .add_stage(TransformStage::new())
            .add_stage(OutputStage::new())
            .build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stages(&self) -> impl Iterator<Item = &dyn PipelineStage> {
        self.stages.iter().map(|s| &**s)
    }

    /// Append a stage during wiring
    pub fn push_stage(&mut self, stage: Box<dyn PipelineStage>) {
        self.stages.push(stage);
    }

    /// Check the adapter holds exactly Input, Transform, Output in order
    pub fn validate(&self) -> NexusResult<()> {
        if self.stages.len() != STAGE_COUNT {
            return Err(NexusError::IncompletePipeline {
                pipeline: self.id.clone(),
                found: self.stages.len(),
            });
        }
        for (index, (stage, expected)) in self.stages.iter().zip(StageRole::ORDER).enumerate() {
            if stage.role() != expected {
                return Err(NexusError::StageOrder {
                    pipeline: self.id.clone(),
                    position: index + 1,
                    expected,
                    found: stage.role(),
                });
            }
        }
        Ok(())
    }

    /// Run a record through the stages without emitting events
    ///
    /// A stage rejecting the record yields a failed `PipelineResult`. Wiring
    /// problems and non-format stage errors are returned as `Err`.
    pub fn execute(&self, record: &Record) -> NexusResult<PipelineResult> {
        let mut context = PipelineContext::new(record.clone());
        self.execute_internal(&mut context, None)
    }

    /// Same as `execute()` but reports progress to `sink`
    pub fn execute_with_events(
        &self,
        context: &mut PipelineContext,
        sink: &dyn EventSink,
    ) -> NexusResult<PipelineResult> {
        self.execute_internal(context, Some(sink))
    }

    fn execute_internal(
        &self,
        context: &mut PipelineContext,
        sink: Option<&dyn EventSink>,
    ) -> NexusResult<PipelineResult> {
        self.validate()?;

        let call_id: Uuid = context.call_id();
        nexus_log!(
            LogLevel::Debug,
            "pipeline",
            "Starting pipeline '{}' with {} stages (call: {})",
            self.id,
            self.stages.len(),
            call_id
        );
        if let Some(sink) = sink {
            EventEmitter::pipeline_started(sink, call_id, &self.id, self.stages.len());
        }

        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());
        context.set_metadata("pipeline_name", &self.id);

        for (index, stage) in self.stages.iter().enumerate() {
            let role = stage.role();
            let stage_name = stage.name();
            let stage_start = Instant::now();

            let input = context.get_required(role.input_key())?.clone();
            let outcome = stage.process(&input);
            let duration = stage_start.elapsed();

            match outcome {
                Ok(value) => {
                    nexus_log!(
                        LogLevel::Debug,
                        "pipeline",
                        "Stage {}/{} '{}' completed in {}µs (call: {})",
                        index + 1,
                        self.stages.len(),
                        stage_name,
                        duration.as_micros(),
                        call_id
                    );
                    if let Some(sink) = sink {
                        EventEmitter::stage_completed(
                            sink,
                            call_id,
                            &self.id,
                            stage_name,
                            index,
                            duration.as_millis() as u64,
                        );
                    }
                    context.set(role.output_key(), value);
                    stage_results.push(StageResult::success(stage_name, role, duration));
                }
                Err(e) if e.is_recoverable() => {
                    let error_msg = e.to_string();
                    nexus_log!(
                        LogLevel::Warn,
                        "pipeline",
                        "Stage '{}' rejected input: {} (call: {})",
                        stage_name,
                        error_msg,
                        call_id
                    );
                    if let Some(sink) = sink {
                        EventEmitter::stage_failed(
                            sink, call_id, &self.id, stage_name, index, &error_msg,
                        );
                    }
                    stage_results.push(StageResult::failure(
                        stage_name,
                        role,
                        error_msg.clone(),
                        duration,
                    ));
                    return Ok(PipelineResult::failure(
                        &self.id,
                        stage_results,
                        error_msg,
                        pipeline_start.elapsed(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        let enrichment = context.get_string(StageRole::Transform.output_key())?;
        let rendered = context.get_string(StageRole::Output.output_key())?;
        let output = format!("{}{}", self.kind.output_prefix(), rendered);

        let total_duration = pipeline_start.elapsed();
        nexus_log!(
            LogLevel::Debug,
            "pipeline",
            "Pipeline '{}' completed in {}µs (call: {})",
            self.id,
            total_duration.as_micros(),
            call_id
        );
        if let Some(sink) = sink {
            EventEmitter::pipeline_completed(
                sink,
                call_id,
                &self.id,
                total_duration.as_millis() as u64,
            );
        }

        Ok(PipelineResult::success(
            &self.id,
            stage_results,
            total_duration,
            enrichment,
            output,
        ))
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for wiring adapters
pub struct AdapterBuilder {
    id: String,
    kind: AdapterKind,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl AdapterBuilder {
    pub fn new(kind: AdapterKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            stages: Vec::new(),
        }
    }

    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Build the adapter. Wiring is checked when it first executes.
    pub fn build(self) -> Adapter {
        Adapter {
            id: self.id,
            kind: self.kind,
            stages: self.stages,
        }
    }
}
