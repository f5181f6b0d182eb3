//! The manager: routes records to adapters, recovers from stage failures and
//! keeps per-format processed counts.

use crate::config::NexusConfig;
use crate::error::{NexusError, NexusResult};
use crate::events::{EventEmitter, EventSink, LogEventSink};
use crate::logger::LogLevel;
use crate::nexus_log;
use crate::pipeline::{Adapter, InputStage, OutputStage, PipelineContext, TransformStage};
use crate::record::{AdapterKind, Record};
use crate::state_machine::{ClassifiedCall, ProcessingCall, Recovering};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fixed acknowledgment reported after every recovery
pub const RECOVERY_ACKNOWLEDGMENT: &str = "Pipeline restored, processing resumed";

/// What a routed call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The adapter's prefixed rendering
    Rendered(String),

    /// A stage failed and the manager swallowed it
    Recovered,
}

impl ProcessOutcome {
    /// Value returned in place of a rendering after recovery
    pub const RECOVERY_SENTINEL: &'static str = "Recovery successful";

    pub fn as_str(&self) -> &str {
        match self {
            ProcessOutcome::Rendered(text) => text,
            ProcessOutcome::Recovered => Self::RECOVERY_SENTINEL,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, ProcessOutcome::Recovered)
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one registered adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub pipeline_id: String,
    pub kind: AdapterKind,
    pub elements_processed: u64,
    pub stage_count: usize,
}

/// Whether a call reports itself and counts toward the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallMode {
    Reported,
    Quiet,
}

/// Routes records to registered adapters
///
/// # Example
/// ```
/// use nexus_lib::config::NexusConfig;
/// use nexus_lib::manager::{NexusManager, ProcessOutcome};
/// use nexus_lib::record::AdapterKind;
/// use serde_json::json;
///
/// let mut manager = NexusManager::with_standard_pipelines(NexusConfig::default());
///
/// let outcome = manager.process(&json!("user,action,timestamp")).unwrap();
/// assert_eq!(
///     outcome,
///     Some(ProcessOutcome::Rendered("User activity logged: 1 actions processed".to_string()))
/// );
/// assert_eq!(manager.count(AdapterKind::Delimited), 1);
///
/// // Out-of-domain input is a silent no-op
/// assert_eq!(manager.process(&json!(42)).unwrap(), None);
/// ```
pub struct NexusManager {
    config: NexusConfig,
    adapters: Vec<Adapter>,
    counts: HashMap<AdapterKind, u64>,
    sink: Box<dyn EventSink>,
}

impl NexusManager {
    /// Manager with no adapters registered
    pub fn new(config: NexusConfig) -> Self {
        Self {
            config,
            adapters: Vec::new(),
            counts: HashMap::new(),
            sink: Box::new(LogEventSink),
        }
    }

    /// Manager wired with one adapter per recognized format
    pub fn with_standard_pipelines(config: NexusConfig) -> Self {
        let input = if config.strict_input {
            InputStage::strict()
        } else {
            InputStage::new()
        };
        let structured = Adapter::builder(AdapterKind::Structured, "Pipeline A")
            .add_stage(input)
            .add_stage(TransformStage::new())
            .add_stage(OutputStage::new())
            .build();

        let mut manager = Self::new(config);
        manager.register(structured);
        manager.register(Adapter::standard(AdapterKind::Delimited, "Pipeline B"));
        manager.register(Adapter::standard(AdapterKind::FreeText, "Pipeline C"));
        manager
    }

    /// Replace the event sink
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &NexusConfig {
        &self.config
    }

    pub fn register(&mut self, adapter: Adapter) {
        nexus_log!(
            LogLevel::Debug,
            "manager",
            "Registered {} for {} data",
            adapter.id(),
            adapter.kind()
        );
        self.counts.entry(adapter.kind()).or_insert(0);
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Adapter] {
        &self.adapters
    }

    /// First registered adapter for `kind`
    pub fn adapter_for(&self, kind: AdapterKind) -> Option<&Adapter> {
        self.adapters.iter().find(|a| a.kind() == kind)
    }

    /// `Stage <n>: <description>` lines for the first adapter's wiring
    pub fn stage_overview(&self) -> Vec<String> {
        self.adapters
            .first()
            .map(|adapter| {
                adapter
                    .stages()
                    .enumerate()
                    .map(|(i, stage)| format!("Stage {}: {}", i + 1, stage.description()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Log the initialization banner and return the stage overview
    pub fn announce(&self) -> Vec<String> {
        nexus_log!(LogLevel::Info, "manager", "Initializing Nexus Manager...");
        nexus_log!(
            LogLevel::Info,
            "manager",
            "Pipeline capacity: {} streams/second",
            self.config.pipeline_capacity
        );
        let overview = self.stage_overview();
        for line in &overview {
            nexus_log!(LogLevel::Info, "manager", "{}", line);
        }
        overview
    }

    /// Route `record` to its adapter and run it.
    ///
    /// Returns `Ok(None)` for unclassifiable input, the rendered string on
    /// success, and `ProcessOutcome::Recovered` when a stage rejected the
    /// record. Only successful calls are counted.
    ///
    /// # Errors
    /// `NexusError::UnroutableInput` when no adapter handles the record's
    /// kind; wiring errors from the adapter.
    pub fn process(&mut self, record: &Record) -> NexusResult<Option<ProcessOutcome>> {
        self.run(record, CallMode::Reported)
    }

    pub(crate) fn run(
        &mut self,
        record: &Record,
        mode: CallMode,
    ) -> NexusResult<Option<ProcessOutcome>> {
        let call = match ProcessingCall::new(record.clone()).classify() {
            ClassifiedCall::Routable(call) => call,
            ClassifiedCall::Unclassified => {
                nexus_log!(LogLevel::Debug, "manager", "Ignoring unclassified input: {}", record);
                return Ok(None);
            }
        };

        let kind = call.kind();
        let Some(adapter) = self.adapter_for(kind) else {
            nexus_log!(
                LogLevel::Error,
                "manager",
                "Unknown pipeline in NexusManager! No adapter for {} data",
                kind
            );
            EventEmitter::input_unroutable(self.sink.as_ref(), call.call_id(), kind);
            return Err(NexusError::UnroutableInput(kind));
        };

        let call = call.dispatch(adapter.id());
        let mut context = PipelineContext::with_call_id(call.call_id(), call.record().clone());
        let result = match adapter.execute_with_events(&mut context, self.sink.as_ref()) {
            Ok(result) => result,
            Err(e) if e.is_recoverable() => {
                return Ok(Some(self.recover(call.fail(e.to_string(), None))));
            }
            Err(e) => return Err(e),
        };

        if !result.success {
            let failed_stage = result.failed_stage().map(|s| s.role);
            let error = result.error.clone().unwrap_or_default();
            return Ok(Some(self.recover(call.fail(error, failed_stage))));
        }

        let enrichment = result.enrichment.unwrap_or_default();
        let call = call.succeed(result.output.unwrap_or_default());

        if mode == CallMode::Reported {
            if self.config.report_results {
                let shown_input = match (kind, record) {
                    (AdapterKind::FreeText, Record::String(text)) => text.clone(),
                    _ => record.to_string(),
                };
                nexus_log!(
                    LogLevel::Info,
                    "manager",
                    "Processing {} data through pipeline...",
                    kind.label()
                );
                nexus_log!(LogLevel::Info, "manager", "Input: {}", shown_input);
                nexus_log!(LogLevel::Info, "manager", "Transform: {}", enrichment);
                nexus_log!(LogLevel::Info, "manager", "Output: {}", call.rendered());
            }
            *self.counts.entry(kind).or_insert(0) += 1;
        }

        nexus_log!(
            LogLevel::Debug,
            "manager",
            "{} finished call {} in {}ms",
            call.pipeline_id(),
            call.call_id(),
            call.elapsed().num_milliseconds()
        );

        Ok(Some(ProcessOutcome::Rendered(call.into_rendered())))
    }

    /// Swallow a stage failure. The report is the same whatever went wrong.
    fn recover(&self, call: ProcessingCall<Recovering>) -> ProcessOutcome {
        let sink = self.sink.as_ref();
        nexus_log!(
            LogLevel::Warn,
            "manager",
            "Error detected in Stage {}: {}",
            call.state.stage_number(),
            call.error()
        );
        EventEmitter::recovery_started(sink, call.call_id(), &call.state.pipeline_id, call.error());
        nexus_log!(
            LogLevel::Info,
            "manager",
            "Recovery initiated: Switching to backup processor"
        );

        let call = call.acknowledge();
        nexus_log!(
            LogLevel::Info,
            "manager",
            "Recovery successful: {}",
            RECOVERY_ACKNOWLEDGMENT
        );
        EventEmitter::recovery_completed(
            sink,
            call.call_id(),
            &call.state.pipeline_id,
            RECOVERY_ACKNOWLEDGMENT,
        );
        ProcessOutcome::Recovered
    }

    /// Processed counts per adapter kind
    pub fn stats(&self) -> HashMap<AdapterKind, u64> {
        self.counts.clone()
    }

    pub fn count(&self, kind: AdapterKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Zero every counter; meant for harnesses running separate batches
    pub fn reset_stats(&mut self) {
        for count in self.counts.values_mut() {
            *count = 0;
        }
    }

    /// Per-adapter snapshot; adapters of the same kind share a counter
    pub fn pipeline_stats(&self) -> Vec<PipelineStats> {
        self.adapters
            .iter()
            .map(|adapter| PipelineStats {
                pipeline_id: adapter.id().to_string(),
                kind: adapter.kind(),
                elements_processed: self.count(adapter.kind()),
                stage_count: adapter.stage_count(),
            })
            .collect()
    }
}

impl fmt::Debug for NexusManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NexusManager")
            .field("config", &self.config)
            .field("adapters", &self.adapters)
            .field("counts", &self.counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_names, MemoryEventSink};
    use serde_json::json;

    fn manager() -> NexusManager {
        NexusManager::with_standard_pipelines(NexusConfig::default())
    }

    #[test]
    fn test_registered_kinds_start_at_zero() {
        let manager = manager();
        let stats = manager.stats();
        assert_eq!(stats.len(), 3);
        assert!(stats.values().all(|&count| count == 0));
    }

    #[test]
    fn test_structured_reading() {
        let mut manager = manager();
        let outcome = manager
            .process(&json!({"sensor": "temp", "value": 23.5, "unit": "C"}))
            .unwrap()
            .unwrap();

        assert_eq!(
            outcome.as_str(),
            "Processed temperature reading: 23.5°C (Normal range)"
        );
        assert_eq!(manager.count(AdapterKind::Structured), 1);
    }

    #[test]
    fn test_recovery_returns_sentinel_without_counting() {
        let sink = MemoryEventSink::new();
        let mut manager = manager().with_event_sink(sink.clone());

        let outcome = manager.process(&json!({"sensor": "temp"})).unwrap();

        assert_eq!(outcome, Some(ProcessOutcome::Recovered));
        assert_eq!(outcome.unwrap().as_str(), "Recovery successful");
        assert_eq!(manager.count(AdapterKind::Structured), 0);

        let names = sink.names();
        assert!(names.contains(&event_names::RECOVERY_STARTED));
        assert_eq!(names.last(), Some(&event_names::RECOVERY_COMPLETED));
    }

    #[test]
    fn test_recovery_message_ignores_cause() {
        let sink = MemoryEventSink::new();
        let mut manager = manager().with_event_sink(sink.clone());

        manager.process(&json!({"sensor": "temp"})).unwrap();
        manager.process(&json!({"sensor": "temp", "value": "warm"})).unwrap();

        let messages: Vec<String> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                crate::events::PipelineEvent::RecoveryCompleted { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m == RECOVERY_ACKNOWLEDGMENT));
    }

    #[test]
    fn test_unclassified_is_silent() {
        let sink = MemoryEventSink::new();
        let mut manager = manager().with_event_sink(sink.clone());

        assert_eq!(manager.process(&json!(42)).unwrap(), None);
        assert!(sink.events().is_empty());
        assert!(manager.stats().values().all(|&c| c == 0));
    }

    #[test]
    fn test_missing_adapter_is_unroutable() {
        let sink = MemoryEventSink::new();
        let mut manager = NexusManager::new(NexusConfig::default()).with_event_sink(sink.clone());
        manager.register(Adapter::standard(AdapterKind::Structured, "Pipeline A"));

        let result = manager.process(&json!("Real-time sensor stream"));

        assert!(matches!(
            result,
            Err(NexusError::UnroutableInput(AdapterKind::FreeText))
        ));
        assert_eq!(sink.names(), vec![event_names::INPUT_UNROUTABLE]);
        assert_eq!(manager.count(AdapterKind::FreeText), 0);
    }

    #[test]
    fn test_incomplete_adapter_surfaces_error() {
        let mut manager = NexusManager::new(NexusConfig::default());
        manager.register(
            Adapter::builder(AdapterKind::Delimited, "Pipeline B")
                .add_stage(InputStage::new())
                .build(),
        );

        assert!(matches!(
            manager.process(&json!("a,b,c")),
            Err(NexusError::IncompletePipeline { .. })
        ));
        assert_eq!(manager.count(AdapterKind::Delimited), 0);
    }

    #[test]
    fn test_strict_input_config_rejects_early() {
        let config = NexusConfig::builder().strict_input(true).build().unwrap();
        let sink = MemoryEventSink::new();
        let mut manager = NexusManager::with_standard_pipelines(config).with_event_sink(sink.clone());

        let outcome = manager.process(&json!({"sensor": "temp"})).unwrap();
        assert_eq!(outcome, Some(ProcessOutcome::Recovered));

        // Input stage failed, so no stage completed
        assert!(!sink.names().contains(&event_names::PIPELINE_STAGE_COMPLETED));
    }

    #[test]
    fn test_new_manager_leaves_process_logger_alone() {
        let before = crate::logger::LOGGER.min_level();
        let config = NexusConfig::builder().log_level(LogLevel::Error).build().unwrap();
        let _quiet = NexusManager::new(config);
        let _default = NexusManager::new(NexusConfig::default());
        assert_eq!(crate::logger::LOGGER.min_level(), before);
    }

    #[test]
    fn test_reset_stats() {
        let mut manager = manager();
        manager.process(&json!("user,action,timestamp")).unwrap();
        manager.process(&json!("Real-time sensor stream")).unwrap();
        assert_eq!(manager.count(AdapterKind::Delimited), 1);
        assert_eq!(manager.count(AdapterKind::FreeText), 1);

        manager.reset_stats();
        assert!(manager.stats().values().all(|&c| c == 0));
    }

    #[test]
    fn test_first_registered_adapter_wins() {
        let mut manager = NexusManager::new(NexusConfig::default());
        manager.register(Adapter::standard(AdapterKind::Delimited, "Primary"));
        manager.register(Adapter::standard(AdapterKind::Delimited, "Secondary"));

        assert_eq!(
            manager.adapter_for(AdapterKind::Delimited).map(|a| a.id()),
            Some("Primary")
        );
    }

    #[test]
    fn test_pipeline_stats_snapshot() {
        let mut manager = manager();
        manager.process(&json!("user,action,timestamp")).unwrap();

        let stats = manager.pipeline_stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[1].pipeline_id, "Pipeline B");
        assert_eq!(stats[1].elements_processed, 1);
        assert_eq!(stats[1].stage_count, 3);

        let json = serde_json::to_value(&stats[1]).unwrap();
        assert_eq!(json["kind"], "delimited");
    }

    #[test]
    fn test_stage_overview() {
        let manager = manager();
        assert_eq!(
            manager.announce(),
            vec![
                "Stage 1: Input validation and parsing",
                "Stage 2: Data transformation and enrichment",
                "Stage 3: Output formatting and delivery",
            ]
        );
        assert!(NexusManager::new(NexusConfig::default()).stage_overview().is_empty());
    }
}
