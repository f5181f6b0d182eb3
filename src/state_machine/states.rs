/// State type definitions for the per-call state machine
///
/// Each state is a distinct type carrying only what later states need.
use crate::pipeline::StageRole;
use crate::record::{AdapterKind, Record};

/// Classifying state - the raw record has just arrived
#[derive(Debug, Clone)]
pub struct Classifying {
    pub record: Record,
}

/// Dispatching state - a kind was chosen, adapter lookup pending
#[derive(Debug, Clone)]
pub struct Dispatching {
    pub record: Record,
    pub kind: AdapterKind,
}

/// Running state - the adapter's stages are executing
#[derive(Debug, Clone)]
pub struct Running {
    pub record: Record,
    pub kind: AdapterKind,
    pub pipeline_id: String,
}

/// Succeeded state - the adapter produced its rendered output
#[derive(Debug, Clone)]
pub struct Succeeded {
    pub kind: AdapterKind,
    pub pipeline_id: String,
    pub rendered: String,
}

/// Recovering state - a stage rejected the record
#[derive(Debug, Clone)]
pub struct Recovering {
    pub pipeline_id: String,
    pub error: String,

    /// Stage that raised the failure, when known
    pub failed_stage: Option<StageRole>,
}

/// Recovered state - the failure was swallowed
#[derive(Debug, Clone)]
pub struct Recovered {
    pub pipeline_id: String,
}

impl Recovering {
    /// Stage number for reports; a failure outside any stage counts as the
    /// transform stage, where rejections normally happen
    pub fn stage_number(&self) -> usize {
        self.failed_stage.unwrap_or(StageRole::Transform).number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovering_stage_number() {
        let recovering = Recovering {
            pipeline_id: "Pipeline A".to_string(),
            error: "missing value".to_string(),
            failed_stage: Some(StageRole::Input),
        };
        assert_eq!(recovering.stage_number(), 1);

        let unknown = Recovering {
            failed_stage: None,
            ..recovering
        };
        assert_eq!(unknown.stage_number(), 2);
    }
}
