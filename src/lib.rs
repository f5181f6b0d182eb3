//! Multi-format data processing pipeline
//!
//! Records (structured readings, delimited rows, free-text stream summaries)
//! are classified, routed to a format-specific adapter, pushed through
//! Input, Transform and Output stages, and rendered as a summary line. The
//! manager counts successful calls per format and swallows stage failures
//! with a fixed recovery acknowledgment.

pub mod chain;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod manager;
pub mod pipeline;
pub mod record;
pub mod state_machine;

pub use chain::{ChainLink, ChainReport, PipelineChain};
pub use config::NexusConfig;
pub use error::{NexusError, NexusResult};
pub use manager::{NexusManager, PipelineStats, ProcessOutcome};
pub use record::{classify, AdapterKind, Classification, Record};
