/// State transition implementations
///
/// Each transition consumes the current state and returns the next one.
use super::states::*;
use super::ProcessingCall;
use crate::pipeline::StageRole;
use crate::record::{classify, AdapterKind, Classification, Record};
use uuid::Uuid;

/// Outcome of the classification step
#[derive(Debug)]
pub enum ClassifiedCall {
    /// Record matched a known format
    Routable(ProcessingCall<Dispatching>),

    /// Record matched nothing; the call ends silently
    Unclassified,
}

// ============================================================================
// Classifying State Transitions
// ============================================================================

impl ProcessingCall<Classifying> {
    pub fn new(record: Record) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            state: Classifying { record },
            started_at: chrono::Utc::now(),
        }
    }

    /// Transition to Dispatching, or end the call if nothing matches
    pub fn classify(self) -> ClassifiedCall {
        match classify(&self.state.record) {
            Classification::Kind(kind) => ClassifiedCall::Routable(ProcessingCall {
                call_id: self.call_id,
                state: Dispatching {
                    record: self.state.record,
                    kind,
                },
                started_at: self.started_at,
            }),
            Classification::Unclassified => ClassifiedCall::Unclassified,
        }
    }
}

// ============================================================================
// Dispatching State Transitions
// ============================================================================

impl ProcessingCall<Dispatching> {
    pub fn kind(&self) -> AdapterKind {
        self.state.kind
    }

    /// Transition to Running on the adapter named `pipeline_id`
    pub fn dispatch(self, pipeline_id: impl Into<String>) -> ProcessingCall<Running> {
        ProcessingCall {
            call_id: self.call_id,
            state: Running {
                record: self.state.record,
                kind: self.state.kind,
                pipeline_id: pipeline_id.into(),
            },
            started_at: self.started_at,
        }
    }
}

// ============================================================================
// Running State Transitions
// ============================================================================

impl ProcessingCall<Running> {
    pub fn record(&self) -> &Record {
        &self.state.record
    }

    pub fn kind(&self) -> AdapterKind {
        self.state.kind
    }

    pub fn pipeline_id(&self) -> &str {
        &self.state.pipeline_id
    }

    /// Transition to Succeeded
    pub fn succeed(self, rendered: String) -> ProcessingCall<Succeeded> {
        ProcessingCall {
            call_id: self.call_id,
            state: Succeeded {
                kind: self.state.kind,
                pipeline_id: self.state.pipeline_id,
                rendered,
            },
            started_at: self.started_at,
        }
    }

    /// Transition to Recovering
    pub fn fail(
        self,
        error: impl Into<String>,
        failed_stage: Option<StageRole>,
    ) -> ProcessingCall<Recovering> {
        ProcessingCall {
            call_id: self.call_id,
            state: Recovering {
                pipeline_id: self.state.pipeline_id,
                error: error.into(),
                failed_stage,
            },
            started_at: self.started_at,
        }
    }
}

// ============================================================================
// Terminal-side Transitions
// ============================================================================

impl ProcessingCall<Succeeded> {
    pub fn kind(&self) -> AdapterKind {
        self.state.kind
    }

    pub fn pipeline_id(&self) -> &str {
        &self.state.pipeline_id
    }

    pub fn rendered(&self) -> &str {
        &self.state.rendered
    }

    pub fn into_rendered(self) -> String {
        self.state.rendered
    }
}

impl ProcessingCall<Recovering> {
    pub fn error(&self) -> &str {
        &self.state.error
    }

    /// Transition to Recovered
    pub fn acknowledge(self) -> ProcessingCall<Recovered> {
        ProcessingCall {
            call_id: self.call_id,
            state: Recovered {
                pipeline_id: self.state.pipeline_id,
            },
            started_at: self.started_at,
        }
    }
}
