//! Source probe trait abstraction.
//!
//! One probe per external source category instance: a platform presence
//! check, a registry lookup, a breach index. The engine treats them all
//! uniformly through this trait, which is what makes deterministic test
//! doubles possible - `FakeProbe` below simulates TIMEOUT/ERROR (and
//! even panicking) probes without touching the network.

use async_trait::async_trait;
use std::time::Duration;

use sleuth_common::{Candidate, EmailAddress, SourceCategory, SourceId, SourceResult};

/// One external lookup against one third-party source.
///
/// Implementations must classify every non-success outcome into
/// `NotFound` / `Timeout` / `Error` and must not block meaningfully past
/// the caller-supplied budget; the scheduler's global deadline is the
/// hard backstop either way.
#[async_trait]
pub trait SourceProbe: Send + Sync {
    fn source_id(&self) -> SourceId;

    fn category(&self) -> SourceCategory;

    async fn probe(&self, email: &EmailAddress, budget: Duration) -> SourceResult;
}

/// What a [`FakeProbe`] does when invoked.
#[derive(Debug, Clone)]
pub enum FakeBehavior {
    Success {
        candidates: Vec<Candidate>,
        payload: Option<serde_json::Value>,
    },
    NotFound,
    Timeout,
    Error(String),
    /// Panics when polled; exercises the scheduler's fault absorption.
    Panic,
}

/// Deterministic probe double.
///
/// Pre-configured outcome plus an optional artificial delay, so tests
/// can script SUCCESS/NOT_FOUND/TIMEOUT/ERROR mixes and slow sources
/// without any network.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    id: SourceId,
    category: SourceCategory,
    behavior: FakeBehavior,
    delay: Duration,
}

impl FakeProbe {
    pub fn success(id: &str, category: SourceCategory) -> Self {
        Self::with_behavior(
            id,
            category,
            FakeBehavior::Success {
                candidates: Vec::new(),
                payload: None,
            },
        )
    }

    pub fn not_found(id: &str, category: SourceCategory) -> Self {
        Self::with_behavior(id, category, FakeBehavior::NotFound)
    }

    pub fn timing_out(id: &str, category: SourceCategory) -> Self {
        Self::with_behavior(id, category, FakeBehavior::Timeout)
    }

    pub fn failing(id: &str, category: SourceCategory, message: &str) -> Self {
        Self::with_behavior(id, category, FakeBehavior::Error(message.to_string()))
    }

    pub fn panicking(id: &str, category: SourceCategory) -> Self {
        Self::with_behavior(id, category, FakeBehavior::Panic)
    }

    pub fn with_behavior(id: &str, category: SourceCategory, behavior: FakeBehavior) -> Self {
        Self {
            id: SourceId::new(id),
            category,
            behavior,
            delay: Duration::ZERO,
        }
    }

    /// Candidates a successful invocation should yield.
    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        if let FakeBehavior::Success {
            candidates: slot, ..
        } = &mut self.behavior
        {
            *slot = candidates;
        }
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        if let FakeBehavior::Success { payload: slot, .. } = &mut self.behavior {
            *slot = Some(payload);
        }
        self
    }

    /// Artificial latency before the outcome is produced.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SourceProbe for FakeProbe {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn probe(&self, _email: &EmailAddress, _budget: Duration) -> SourceResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let latency_ms = self.delay.as_millis() as u64;
        match &self.behavior {
            FakeBehavior::Success {
                candidates,
                payload,
            } => SourceResult::success(
                self.id.clone(),
                self.category,
                payload.clone(),
                candidates.clone(),
                latency_ms,
            ),
            FakeBehavior::NotFound => {
                SourceResult::not_found(self.id.clone(), self.category, latency_ms)
            }
            FakeBehavior::Timeout => {
                SourceResult::timeout(self.id.clone(), self.category, latency_ms)
            }
            FakeBehavior::Error(message) => {
                SourceResult::error(self.id.clone(), self.category, message.clone(), latency_ms)
            }
            FakeBehavior::Panic => panic!("fake probe '{}' deliberately panicked", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_common::{FactKind, ProbeStatus};

    #[tokio::test]
    async fn fake_probe_reports_scripted_outcome() {
        let email = EmailAddress::parse("a@b.co").unwrap();
        let probe = FakeProbe::success("social.medium", SourceCategory::SocialPlatform)
            .with_candidates(vec![Candidate::new(
                FactKind::Name,
                "Ada",
                SourceId::new("social.medium"),
                20,
            )]);

        let result = probe.probe(&email, Duration::from_secs(1)).await;
        assert_eq!(result.status, ProbeStatus::Success);
        assert_eq!(result.candidates.len(), 1);

        let result = FakeProbe::failing("registry.rdap", SourceCategory::DomainRegistry, "boom")
            .probe(&email, Duration::from_secs(1))
            .await;
        assert_eq!(result.status, ProbeStatus::Error);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn fake_probe_delay_is_reflected_in_latency() {
        let email = EmailAddress::parse("a@b.co").unwrap();
        let probe = FakeProbe::not_found("dev.gitlab", SourceCategory::DevPlatform)
            .with_delay(Duration::from_millis(120));
        let result = probe.probe(&email, Duration::from_secs(1)).await;
        assert_eq!(result.latency_ms, 120);
    }
}
