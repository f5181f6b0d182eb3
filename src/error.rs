use crate::record::AdapterKind;
use crate::pipeline::StageRole;
use thiserror::Error;

/// Central error type for the Nexus pipeline
#[derive(Error, Debug)]
pub enum NexusError {
    // ============================================================================
    // Stage Errors
    // ============================================================================
    /// A stage rejected its input. The only recoverable kind.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    // ============================================================================
    // Routing Errors
    // ============================================================================
    #[error("Unknown pipeline in NexusManager: no adapter registered for {0} data")]
    UnroutableInput(AdapterKind),

    // ============================================================================
    // Wiring Errors
    // ============================================================================
    #[error("Pipeline '{pipeline}' needs exactly 3 stages, found {found}")]
    IncompletePipeline { pipeline: String, found: usize },

    #[error("Pipeline '{pipeline}' stage {position} must be {expected}, found {found}")]
    StageOrder {
        pipeline: String,
        position: usize,
        expected: StageRole,
        found: StageRole,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mutex lock error")]
    LockError,
}

impl NexusError {
    /// Build an `InvalidFormat` error from any message
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        NexusError::InvalidFormat(reason.into())
    }

    /// Whether the manager's recovery protocol applies to this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NexusError::InvalidFormat(_))
    }
}

// Implement conversion from PoisonError for Mutex locks
impl<T> From<std::sync::PoisonError<T>> for NexusError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        NexusError::LockError
    }
}

impl From<NexusError> for String {
    fn from(error: NexusError) -> Self {
        error.to_string()
    }
}

// Helper type alias for Results
pub type NexusResult<T> = Result<T, NexusError>;
