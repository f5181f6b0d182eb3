//! Adapter pipelines: three ordered stages per record format
//!
//! Each adapter runs a record through Input, Transform and Output stages.
//! The transform stage only describes the enrichment; the output stage
//! renders the validated input, and the adapter prefixes that rendering with
//! its format-specific label.
//!
//! # Example
//! ```
//! use nexus_lib::pipeline::{Adapter, InputStage, OutputStage, TransformStage};
//! use nexus_lib::record::AdapterKind;
//! use serde_json::json;
//!
//! let adapter = Adapter::builder(AdapterKind::Structured, "Pipeline A")
//!     .add_stage(InputStage::strict())
//!     .add_stage(TransformStage::new())
//!     .add_stage(OutputStage::new())
//!     .build();
//!
//! let result = adapter.execute(&json!({"sensor": "temp", "value": 40, "unit": "C"})).unwrap();
//! assert!(result.output.unwrap().ends_with("(Canicule range)"));
//! ```

pub mod context;
pub mod core;
pub mod executor;
pub mod stages;

// Re-export main types
pub use context::PipelineContext;
pub use core::{PipelineResult, PipelineStage, StageResult, StageRole};
pub use executor::{Adapter, AdapterBuilder, STAGE_COUNT};
pub use stages::{InputStage, OutputStage, TransformStage};
