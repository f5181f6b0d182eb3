use crate::logger::LogLevel;
use crate::nexus_log;
use crate::record::AdapterKind;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Event names - centralized for consistency
pub mod event_names {
    pub const PIPELINE_STARTED: &str = "pipeline:started";
    pub const PIPELINE_STAGE_COMPLETED: &str = "pipeline:stage-completed";
    pub const PIPELINE_STAGE_FAILED: &str = "pipeline:stage-failed";
    pub const PIPELINE_COMPLETED: &str = "pipeline:completed";
    pub const RECOVERY_STARTED: &str = "recovery:started";
    pub const RECOVERY_COMPLETED: &str = "recovery:completed";
    pub const INPUT_UNROUTABLE: &str = "input:unroutable";
}

/// Something observable that happened while processing a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PipelineEvent {
    #[serde(rename_all = "camelCase")]
    PipelineStarted {
        call_id: Uuid,
        pipeline_name: String,
        total_stages: usize,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    StageCompleted {
        call_id: Uuid,
        pipeline_name: String,
        stage_name: String,
        stage_index: usize,
        duration_ms: u64,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    StageFailed {
        call_id: Uuid,
        pipeline_name: String,
        stage_name: String,
        stage_index: usize,
        error: String,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    PipelineCompleted {
        call_id: Uuid,
        pipeline_name: String,
        total_duration_ms: u64,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    RecoveryStarted {
        call_id: Uuid,
        pipeline_name: String,
        error: String,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    RecoveryCompleted {
        call_id: Uuid,
        pipeline_name: String,
        message: String,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    InputUnroutable {
        call_id: Uuid,
        kind: AdapterKind,
        timestamp: String,
    },
}

impl PipelineEvent {
    /// Stable event name for this variant
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::PipelineStarted { .. } => event_names::PIPELINE_STARTED,
            PipelineEvent::StageCompleted { .. } => event_names::PIPELINE_STAGE_COMPLETED,
            PipelineEvent::StageFailed { .. } => event_names::PIPELINE_STAGE_FAILED,
            PipelineEvent::PipelineCompleted { .. } => event_names::PIPELINE_COMPLETED,
            PipelineEvent::RecoveryStarted { .. } => event_names::RECOVERY_STARTED,
            PipelineEvent::RecoveryCompleted { .. } => event_names::RECOVERY_COMPLETED,
            PipelineEvent::InputUnroutable { .. } => event_names::INPUT_UNROUTABLE,
        }
    }

    pub fn call_id(&self) -> Uuid {
        match self {
            PipelineEvent::PipelineStarted { call_id, .. }
            | PipelineEvent::StageCompleted { call_id, .. }
            | PipelineEvent::StageFailed { call_id, .. }
            | PipelineEvent::PipelineCompleted { call_id, .. }
            | PipelineEvent::RecoveryStarted { call_id, .. }
            | PipelineEvent::RecoveryCompleted { call_id, .. }
            | PipelineEvent::InputUnroutable { call_id, .. } => *call_id,
        }
    }
}

/// Receiver for pipeline events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Sink that writes events to the process logger at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: PipelineEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => nexus_log!(LogLevel::Debug, "events", "{} {}", event.name(), json),
            Err(e) => nexus_log!(LogLevel::Warn, "events", "Failed to serialize event: {}", e),
        }
    }
}

/// Sink that keeps every event in memory; clones share one buffer
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Names of the collected events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(PipelineEvent::name).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Event constructor helpers
pub struct EventEmitter;

impl EventEmitter {
    pub fn pipeline_started(
        sink: &dyn EventSink,
        call_id: Uuid,
        pipeline_name: &str,
        total_stages: usize,
    ) {
        sink.emit(PipelineEvent::PipelineStarted {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            total_stages,
            timestamp: now(),
        });
    }

    pub fn stage_completed(
        sink: &dyn EventSink,
        call_id: Uuid,
        pipeline_name: &str,
        stage_name: &str,
        stage_index: usize,
        duration_ms: u64,
    ) {
        sink.emit(PipelineEvent::StageCompleted {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            stage_name: stage_name.to_string(),
            stage_index,
            duration_ms,
            timestamp: now(),
        });
    }

    pub fn stage_failed(
        sink: &dyn EventSink,
        call_id: Uuid,
        pipeline_name: &str,
        stage_name: &str,
        stage_index: usize,
        error: &str,
    ) {
        sink.emit(PipelineEvent::StageFailed {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            stage_name: stage_name.to_string(),
            stage_index,
            error: error.to_string(),
            timestamp: now(),
        });
    }

    pub fn pipeline_completed(
        sink: &dyn EventSink,
        call_id: Uuid,
        pipeline_name: &str,
        total_duration_ms: u64,
    ) {
        sink.emit(PipelineEvent::PipelineCompleted {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            total_duration_ms,
            timestamp: now(),
        });
    }

    pub fn recovery_started(sink: &dyn EventSink, call_id: Uuid, pipeline_name: &str, error: &str) {
        sink.emit(PipelineEvent::RecoveryStarted {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            error: error.to_string(),
            timestamp: now(),
        });
    }

    pub fn recovery_completed(
        sink: &dyn EventSink,
        call_id: Uuid,
        pipeline_name: &str,
        message: &str,
    ) {
        sink.emit(PipelineEvent::RecoveryCompleted {
            call_id,
            pipeline_name: pipeline_name.to_string(),
            message: message.to_string(),
            timestamp: now(),
        });
    }

    pub fn input_unroutable(sink: &dyn EventSink, call_id: Uuid, kind: AdapterKind) {
        sink.emit(PipelineEvent::InputUnroutable {
            call_id,
            kind,
            timestamp: now(),
        });
    }
}
