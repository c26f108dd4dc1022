//! Probe scheduler - concurrent fan-out with partial-failure tolerance.
//!
//! All configured probes launch as independent tokio tasks; results are
//! collected as they complete. Two limits apply: a per-category
//! concurrency ceiling (semaphore-backed token pool owned by the run,
//! never a process-wide singleton) and a global hard deadline that
//! always wins over any per-probe soft timeout. Every launched probe is
//! guaranteed a recorded `SourceResult`: completed, timed out, faulted,
//! or abandoned on cancellation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use sleuth_common::{EmailAddress, EngineConfig, SourceCategory, SourceId, SourceResult};

use crate::probe::SourceProbe;

/// Create a linked cancellation pair. Dropping the handle without
/// cancelling leaves the token inert.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller-side cancellation trigger.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Scheduler-side cancellation signal.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never fire; for callers that do not cancel.
    pub fn none() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Resolves once cancellation is requested. If the handle was
    /// dropped without cancelling, pends forever.
    pub async fn cancelled(mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Runs a set of probes under a global deadline and per-category
/// concurrency limits.
pub struct ProbeScheduler {
    global_timeout: Duration,
    per_source_concurrency: usize,
}

impl ProbeScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            global_timeout: Duration::from_millis(config.timeout_ms),
            per_source_concurrency: config.per_source_concurrency,
        }
    }

    /// Fan out all probes and collect one result per probe.
    ///
    /// Never fails: probe faults, timeouts and cancellation all degrade
    /// to recorded `SourceResult`s.
    pub async fn run(
        &self,
        probes: &[Arc<dyn SourceProbe>],
        email: &EmailAddress,
        cancel: CancelToken,
    ) -> Vec<SourceResult> {
        let started = Instant::now();
        let deadline = started + self.global_timeout;

        let mut semaphores: HashMap<SourceCategory, Arc<Semaphore>> = HashMap::new();
        let mut outstanding: BTreeMap<SourceId, SourceCategory> = BTreeMap::new();
        let mut tasks: JoinSet<(SourceId, SourceResult)> = JoinSet::new();

        for probe in probes {
            let id = probe.source_id();
            let category = probe.category();
            if outstanding.contains_key(&id) {
                warn!("duplicate probe registration for '{}'; skipping", id);
                continue;
            }
            outstanding.insert(id.clone(), category);

            let semaphore = semaphores
                .entry(category)
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_source_concurrency)))
                .clone();
            let probe = Arc::clone(probe);
            let email = email.clone();
            let budget = self.global_timeout;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            id.clone(),
                            SourceResult::error(id, category, "scheduling slot closed", 0),
                        );
                    }
                };
                let launched = Instant::now();
                debug!("probe '{}' launched", id);

                // Inner spawn so a panicking probe surfaces as a
                // JoinError here instead of taking siblings down.
                let fallible = tokio::spawn(async move { probe.probe(&email, budget).await });
                let result = match fallible.await {
                    Ok(result) => result,
                    Err(fault) => SourceResult::error(
                        id.clone(),
                        category,
                        format!("probe fault: {fault}"),
                        launched.elapsed().as_millis() as u64,
                    ),
                };
                (id, result)
            });
        }

        let total = outstanding.len();
        let mut results: Vec<SourceResult> = Vec::with_capacity(total);

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((id, result))) => {
                        debug!(
                            "probe '{}' finished: {:?} in {}ms",
                            id, result.status, result.latency_ms
                        );
                        outstanding.remove(&id);
                        results.push(result);
                    }
                    Some(Err(fault)) => {
                        // Outer tasks absorb probe panics themselves;
                        // reaching this means an aborted task drained late.
                        warn!("scheduler task fault: {}", fault);
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    self.drain_finished(&mut tasks, &mut outstanding, &mut results);
                    warn!(
                        "global deadline elapsed with {} of {} probes outstanding",
                        outstanding.len(),
                        total
                    );
                    tasks.abort_all();
                    let elapsed = started.elapsed().as_millis() as u64;
                    while let Some((id, category)) = outstanding.pop_first() {
                        results.push(SourceResult::timeout(id, category, elapsed));
                    }
                    break;
                }
                _ = cancel.clone().cancelled() => {
                    self.drain_finished(&mut tasks, &mut outstanding, &mut results);
                    info!(
                        "run cancelled; abandoning {} in-flight probes",
                        outstanding.len()
                    );
                    tasks.abort_all();
                    let elapsed = started.elapsed().as_millis() as u64;
                    while let Some((id, category)) = outstanding.pop_first() {
                        results.push(SourceResult::error(id, category, "cancelled", elapsed));
                    }
                    break;
                }
            }
        }

        info!(
            "scheduler done: {} results in {}ms",
            results.len(),
            started.elapsed().as_millis()
        );
        results
    }

    /// Collect tasks that already finished so a deadline or cancellation
    /// never discards a completed result.
    fn drain_finished(
        &self,
        tasks: &mut JoinSet<(SourceId, SourceResult)>,
        outstanding: &mut BTreeMap<SourceId, SourceCategory>,
        results: &mut Vec<SourceResult>,
    ) {
        while let Some(joined) = tasks.try_join_next() {
            if let Ok((id, result)) = joined {
                outstanding.remove(&id);
                results.push(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FakeProbe;
    use async_trait::async_trait;
    use sleuth_common::ProbeStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(timeout_ms: u64, per_source: usize) -> EngineConfig {
        EngineConfig {
            timeout_ms,
            per_source_concurrency: per_source,
            ..EngineConfig::default()
        }
    }

    fn email() -> EmailAddress {
        EmailAddress::parse("jane.doe@example.org").unwrap()
    }

    fn by_id(results: &[SourceResult], id: &str) -> ProbeStatus {
        results
            .iter()
            .find(|r| r.source.as_str() == id)
            .map(|r| r.status)
            .unwrap_or_else(|| panic!("no result for {id}"))
    }

    #[tokio::test(start_paused = true)]
    async fn collects_all_results_when_probes_finish_in_time() {
        let probes: Vec<Arc<dyn SourceProbe>> = vec![
            Arc::new(
                FakeProbe::success("a.fast", SourceCategory::SocialPlatform)
                    .with_delay(Duration::from_millis(10)),
            ),
            Arc::new(
                FakeProbe::not_found("b.slow", SourceCategory::DevPlatform)
                    .with_delay(Duration::from_millis(50)),
            ),
        ];
        let scheduler = ProbeScheduler::new(&config(1_000, 4));
        let results = scheduler.run(&probes, &email(), CancelToken::none()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(by_id(&results, "a.fast"), ProbeStatus::Success);
        assert_eq!(by_id(&results, "b.slow"), ProbeStatus::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn global_deadline_marks_stragglers_timeout() {
        let probes: Vec<Arc<dyn SourceProbe>> = vec![
            Arc::new(
                FakeProbe::success("a.fast", SourceCategory::SocialPlatform)
                    .with_delay(Duration::from_millis(20)),
            ),
            Arc::new(
                FakeProbe::success("b.straggler", SourceCategory::SocialPlatform)
                    .with_delay(Duration::from_secs(60)),
            ),
        ];
        let scheduler = ProbeScheduler::new(&config(200, 4));
        let results = scheduler.run(&probes, &email(), CancelToken::none()).await;

        assert_eq!(results.len(), 2);
        // the completed probe's result is kept regardless of the straggler
        assert_eq!(by_id(&results, "a.fast"), ProbeStatus::Success);
        assert_eq!(by_id(&results, "b.straggler"), ProbeStatus::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_probe_becomes_error_and_spares_siblings() {
        let probes: Vec<Arc<dyn SourceProbe>> = vec![
            Arc::new(FakeProbe::panicking("a.bad", SourceCategory::BreachIndex)),
            Arc::new(FakeProbe::success("b.good", SourceCategory::SocialPlatform)),
        ];
        let scheduler = ProbeScheduler::new(&config(1_000, 4));
        let results = scheduler.run(&probes, &email(), CancelToken::none()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(by_id(&results, "a.bad"), ProbeStatus::Error);
        assert_eq!(by_id(&results, "b.good"), ProbeStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_in_flight_probes() {
        let probes: Vec<Arc<dyn SourceProbe>> = vec![
            Arc::new(
                FakeProbe::success("a.fast", SourceCategory::SocialPlatform)
                    .with_delay(Duration::from_millis(5)),
            ),
            Arc::new(
                FakeProbe::success("b.slow", SourceCategory::DevPlatform)
                    .with_delay(Duration::from_secs(30)),
            ),
        ];
        let (handle, token) = cancel_pair();
        let scheduler = ProbeScheduler::new(&config(60_000, 4));
        let email = email();

        let run = scheduler.run(&probes, &email, token);
        let trigger = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel();
        };
        let (results, ()) = tokio::join!(run, trigger);

        assert_eq!(results.len(), 2);
        assert_eq!(by_id(&results, "a.fast"), ProbeStatus::Success);
        let abandoned = results
            .iter()
            .find(|r| r.source.as_str() == "b.slow")
            .unwrap();
        assert_eq!(abandoned.status, ProbeStatus::Error);
        assert_eq!(abandoned.error.as_deref(), Some("cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_source_ids_yield_one_result() {
        let probes: Vec<Arc<dyn SourceProbe>> = vec![
            Arc::new(FakeProbe::success("a.dup", SourceCategory::SocialPlatform)),
            Arc::new(FakeProbe::failing("a.dup", SourceCategory::SocialPlatform, "boom")),
        ];
        let scheduler = ProbeScheduler::new(&config(1_000, 4));
        let results = scheduler.run(&probes, &email(), CancelToken::none()).await;

        assert_eq!(results.len(), 1);
        assert_eq!(by_id(&results, "a.dup"), ProbeStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_probe_set_returns_immediately() {
        let scheduler = ProbeScheduler::new(&config(1_000, 4));
        let results = scheduler.run(&[], &email(), CancelToken::none()).await;
        assert!(results.is_empty());
    }

    /// Records how many invocations run concurrently.
    struct GaugeProbe {
        id: SourceId,
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SourceProbe for GaugeProbe {
        fn source_id(&self) -> SourceId {
            self.id.clone()
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::SocialPlatform
        }

        async fn probe(&self, _email: &EmailAddress, _budget: Duration) -> SourceResult {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            SourceResult::success(self.id.clone(), SourceCategory::SocialPlatform, None, vec![], 50)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn per_category_ceiling_limits_in_flight_probes() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let probes: Vec<Arc<dyn SourceProbe>> = (0..6)
            .map(|i| {
                Arc::new(GaugeProbe {
                    id: SourceId::new(format!("social.gauge{i}")),
                    current: Arc::clone(&current),
                    peak: Arc::clone(&peak),
                }) as Arc<dyn SourceProbe>
            })
            .collect();

        let scheduler = ProbeScheduler::new(&config(10_000, 2));
        let results = scheduler.run(&probes, &email(), CancelToken::none()).await;

        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.status == ProbeStatus::Success));
        assert!(peak.load(Ordering::SeqCst) <= 2, "ceiling exceeded");
    }
}
