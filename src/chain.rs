//! Chaining: one pipeline's output becomes the next pipeline's input

use crate::error::{NexusError, NexusResult};
use crate::logger::LogLevel;
use crate::manager::{CallMode, NexusManager, ProcessOutcome};
use crate::nexus_log;
use crate::pipeline::STAGE_COUNT;
use crate::record::{
    classify, delimiter_count, mentions_stream, AdapterKind, Record, MIN_DELIMITERS,
};
use std::time::{Duration, Instant};

/// How a prior outcome is wrapped into the next record
///
/// Links are only built through `delimited` and `free_text`, which check that
/// the prefix classifies on its own. A wrapped record is therefore never
/// unclassified, whatever the prior outcome says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    target: AdapterKind,
    prefix: String,
}

impl ChainLink {
    /// `<prefix><prior>` as a delimited row; the prefix needs two commas
    pub fn delimited(prefix: impl Into<String>) -> NexusResult<Self> {
        let prefix = prefix.into();
        if delimiter_count(&prefix) < MIN_DELIMITERS {
            return Err(NexusError::BuilderError(format!(
                "delimited link prefix '{}' needs at least {} commas",
                prefix, MIN_DELIMITERS
            )));
        }
        Ok(Self {
            target: AdapterKind::Delimited,
            prefix,
        })
    }

    /// `<prefix><prior>` as free text; the prefix must mention a stream
    pub fn free_text(prefix: impl Into<String>) -> NexusResult<Self> {
        let prefix = prefix.into();
        if !mentions_stream(&prefix) {
            return Err(NexusError::BuilderError(format!(
                "free-text link prefix '{}' must mention a stream",
                prefix
            )));
        }
        Ok(Self {
            target: AdapterKind::FreeText,
            prefix,
        })
    }

    /// Kind the link was built for. Delimited wins classification, so a
    /// free-text link over a prior with two commas still routes as delimited.
    pub fn target(&self) -> AdapterKind {
        self.target
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the next record from the prior outcome text
    pub fn wrap(&self, prior: &str) -> Record {
        Record::String(format!("{}{}", self.prefix, prior))
    }
}

/// Ordered links applied after the first hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineChain {
    links: Vec<ChainLink>,
}

impl PipelineChain {
    pub fn new(links: Vec<ChainLink>) -> Self {
        Self { links }
    }

    /// Structured reading, then an activity row, then a stream update
    pub fn standard() -> NexusResult<Self> {
        Ok(Self::new(vec![
            ChainLink::delimited("chain_log,status,")?,
            ChainLink::free_text("Final stream update: ")?,
        ]))
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }
}

/// One call in a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainHop {
    pub input: Record,
    pub outcome: Option<ProcessOutcome>,
}

/// What a chain run did
#[derive(Debug, Clone)]
pub struct ChainReport {
    /// Registered pipeline ids in order, e.g. `Pipeline A -> Pipeline B`
    pub route: String,
    pub hops: Vec<ChainHop>,

    /// Set when some hop was unclassified; later links never ran
    pub terminated_early: bool,
    pub stage_count: usize,
    pub elapsed: Duration,
}

impl ChainReport {
    /// Hops that produced an outcome
    pub fn completed_hops(&self) -> usize {
        self.hops.iter().filter(|h| h.outcome.is_some()).count()
    }

    pub fn final_outcome(&self) -> Option<&ProcessOutcome> {
        self.hops.last().and_then(|h| h.outcome.as_ref())
    }

    pub fn summary(&self) -> Vec<String> {
        vec![
            self.route.clone(),
            format!(
                "Chain result: {} records processed through {}-stage pipeline",
                self.completed_hops(),
                self.stage_count
            ),
            format!(
                "Performance: {:.4}s total processing time",
                self.elapsed.as_secs_f64()
            ),
        ]
    }
}

impl NexusManager {
    /// Feed `start` through the manager, then each link's wrapping of the
    /// previous outcome.
    ///
    /// Hops run quietly: no per-call report and no counter increments. The
    /// chain stops at the first unclassified record.
    pub fn run_chain(&mut self, chain: &PipelineChain, start: &Record) -> NexusResult<ChainReport> {
        let route = self
            .adapters()
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(" -> ");
        let stage_count = self
            .adapters()
            .first()
            .map(|a| a.stage_count())
            .unwrap_or(STAGE_COUNT);

        nexus_log!(LogLevel::Info, "chain", "{}", route);
        let started = Instant::now();

        let mut hops = Vec::with_capacity(chain.links().len() + 1);
        let outcome = self.run(start, CallMode::Quiet)?;
        hops.push(ChainHop {
            input: start.clone(),
            outcome,
        });

        for link in chain.links() {
            let Some(prior) = hops.last().and_then(|h| h.outcome.clone()) else {
                break;
            };
            let next = link.wrap(prior.as_str());
            let outcome = self.run(&next, CallMode::Quiet)?;
            hops.push(ChainHop {
                input: next,
                outcome,
            });
        }

        let terminated_early = hops.iter().any(|h| h.outcome.is_none());
        let report = ChainReport {
            route,
            hops,
            terminated_early,
            stage_count,
            elapsed: started.elapsed(),
        };
        for line in report.summary().iter().skip(1) {
            nexus_log!(LogLevel::Info, "chain", "{}", line);
        }
        Ok(report)
    }
}

/// Whether `prior` stays routable after `link` wraps it
pub fn reclassifiable(link: &ChainLink, prior: &str) -> bool {
    classify(&link.wrap(prior)).kind().is_some()
}
