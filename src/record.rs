//! Record shapes and the classification rule that routes them to adapters

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The untyped payload flowing through a pipeline
///
/// Inputs arrive already deserialized: objects are structured readings,
/// strings are delimited rows or free-text stream summaries, and anything
/// else is out of domain.
pub type Record = Value;

/// Keyword that marks free text as a stream summary
pub const STREAM_KEYWORD: &str = "stream";

/// Minimum number of commas for text to count as delimited
pub const MIN_DELIMITERS: usize = 2;

/// The closed set of pipeline variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Key/value sensor readings
    Structured,
    /// Comma-separated rows
    Delimited,
    /// Free text mentioning a stream
    FreeText,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 3] = [
        AdapterKind::Structured,
        AdapterKind::Delimited,
        AdapterKind::FreeText,
    ];

    /// Short label used when reporting a call
    pub fn label(&self) -> &'static str {
        match self {
            AdapterKind::Structured => "JSON",
            AdapterKind::Delimited => "CSV",
            AdapterKind::FreeText => "Stream",
        }
    }

    /// Prefix the adapter puts in front of the output stage's rendering
    pub fn output_prefix(&self) -> &'static str {
        match self {
            AdapterKind::Structured => "Processed temperature reading: ",
            AdapterKind::Delimited => "User activity logged: ",
            AdapterKind::FreeText => "Stream summary: ",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Kind(AdapterKind),
    Unclassified,
}

impl Classification {
    pub fn kind(self) -> Option<AdapterKind> {
        match self {
            Classification::Kind(kind) => Some(kind),
            Classification::Unclassified => None,
        }
    }
}

/// Count of ASCII commas in `text`
pub fn delimiter_count(text: &str) -> usize {
    text.matches(',').count()
}

/// Case-insensitive check for the stream keyword
pub fn mentions_stream(text: &str) -> bool {
    text.to_lowercase().contains(STREAM_KEYWORD)
}

/// Pick the adapter kind for `record`.
///
/// Precedence: objects are structured, then text with at least two commas is
/// delimited, then text mentioning "stream" is free text. Everything else,
/// including null, numbers and arrays, is unclassified.
pub fn classify(record: &Record) -> Classification {
    match record {
        Value::Object(_) => Classification::Kind(AdapterKind::Structured),
        Value::String(text) if delimiter_count(text) >= MIN_DELIMITERS => {
            Classification::Kind(AdapterKind::Delimited)
        }
        Value::String(text) if mentions_stream(text) => {
            Classification::Kind(AdapterKind::FreeText)
        }
        _ => Classification::Unclassified,
    }
}
