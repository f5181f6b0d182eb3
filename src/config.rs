use crate::error::{NexusError, NexusResult};
use crate::logger::{init_tracing, LogLevel, LOGGER};
use serde::{Deserialize, Serialize};

/// Manager configuration
///
/// Settings only affect reporting and validation strictness. The set of
/// recognized formats is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    /// Streams per second announced in the initialization banner
    pub pipeline_capacity: u32,

    /// Log the input, transform descriptor and output of every call
    pub report_results: bool,

    /// Wire structured adapters with the strict input stage
    pub strict_input: bool,

    /// Minimum level kept by the process logger
    pub log_level: LogLevel,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            pipeline_capacity: 1000,
            report_results: true,
            strict_input: false,
            log_level: LogLevel::Info,
        }
    }
}

impl NexusConfig {
    pub fn builder() -> NexusConfigBuilder {
        NexusConfigBuilder::new()
    }

    /// Apply `log_level` to the process logger and install the `tracing`
    /// subscriber. Managers never touch the global logger themselves.
    pub fn install_logging(&self) {
        LOGGER.set_min_level(self.log_level);
        init_tracing(self.log_level);
    }

    pub fn validate(&self) -> NexusResult<()> {
        if self.pipeline_capacity == 0 {
            return Err(NexusError::ConfigError(
                "pipeline_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing NexusConfig instances with a fluent API
///
/// # Example
/// ```
/// use nexus_lib::config::NexusConfigBuilder;
///
/// let config = NexusConfigBuilder::new()
///     .pipeline_capacity(500)
///     .report_results(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.pipeline_capacity, 500);
/// ```
#[derive(Debug, Default)]
pub struct NexusConfigBuilder {
    pipeline_capacity: Option<u32>,
    report_results: Option<bool>,
    strict_input: Option<bool>,
    log_level: Option<LogLevel>,
}

impl NexusConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline_capacity(mut self, capacity: u32) -> Self {
        self.pipeline_capacity = Some(capacity);
        self
    }

    pub fn report_results(mut self, report: bool) -> Self {
        self.report_results = Some(report);
        self
    }

    pub fn strict_input(mut self, strict: bool) -> Self {
        self.strict_input = Some(strict);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level by name ("debug", "info", "warn", "error")
    pub fn log_level_name(mut self, name: &str) -> NexusResult<Self> {
        let level = LogLevel::parse(name)
            .ok_or_else(|| NexusError::BuilderError(format!("Unknown log level: {}", name)))?;
        self.log_level = Some(level);
        Ok(self)
    }

    /// # Errors
    /// Returns `NexusError::BuilderError` if a field is out of range
    pub fn build(self) -> NexusResult<NexusConfig> {
        let defaults = NexusConfig::default();
        let config = NexusConfig {
            pipeline_capacity: self.pipeline_capacity.unwrap_or(defaults.pipeline_capacity),
            report_results: self.report_results.unwrap_or(defaults.report_results),
            strict_input: self.strict_input.unwrap_or(defaults.strict_input),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        };
        config
            .validate()
            .map_err(|e| NexusError::BuilderError(e.to_string()))?;
        Ok(config)
    }
}
