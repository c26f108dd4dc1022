//! Engine front door: validate, fan out, aggregate, score, assemble.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use sleuth_common::{EmailAddress, EngineConfig, Report, SleuthError};

use crate::aggregate;
use crate::extractor;
use crate::probe::SourceProbe;
use crate::report;
use crate::reputation;
use crate::scheduler::{CancelToken, ProbeScheduler};
use crate::score;

/// One configured investigation engine.
///
/// Construction validates the configuration, so weight errors surface
/// before any run starts. The engine is agnostic to how many or which
/// probes are registered; zero probes is a valid (offline) setup.
pub struct Engine {
    config: EngineConfig,
    probes: Vec<Arc<dyn SourceProbe>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, SleuthError> {
        config.validate()?;
        Ok(Self {
            config,
            probes: Vec::new(),
        })
    }

    pub fn with_probes(mut self, probes: Vec<Arc<dyn SourceProbe>>) -> Self {
        self.probes = probes;
        self
    }

    pub fn register(&mut self, probe: Arc<dyn SourceProbe>) {
        self.probes.push(probe);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Investigate one address to completion.
    pub async fn investigate(&self, raw_email: &str) -> Result<Report, SleuthError> {
        self.investigate_with_cancel(raw_email, CancelToken::none())
            .await
    }

    /// Investigate with caller-side cancellation. On cancel, partial
    /// results already obtained are still aggregated into the report.
    pub async fn investigate_with_cancel(
        &self,
        raw_email: &str,
        cancel: CancelToken,
    ) -> Result<Report, SleuthError> {
        // Malformed input fails here, before anything is scheduled.
        let email = EmailAddress::parse(raw_email)?;
        let started = Instant::now();
        info!("investigating {} with {} probes", email, self.probes.len());

        let heuristics = extractor::extract(email.local_part(), &self.config.source_weights);
        debug!("extractor produced {} candidates", heuristics.len());

        let scheduler = ProbeScheduler::new(&self.config);
        let results = scheduler.run(&self.probes, &email, cancel).await;

        let record = aggregate::aggregate(&heuristics, &results);
        let score = score::score(&record, &results, &self.config.scoring);
        let reputation = reputation::assess(&email, &results);
        let report = report::assemble(email, record, results, score, reputation, started.elapsed());

        info!(
            "investigation done: score {} ({} patterns, {}/{} sources) in {}ms",
            report.score.score,
            report.score.patterns_found,
            report.score.sources_succeeded,
            report.score.sources_queried,
            report.elapsed_ms
        );
        Ok(report)
    }
}
