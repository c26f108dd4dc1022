//! Core data model: email addresses, candidates, source results,
//! aggregated records, and the final report.
//!
//! Every type here is created once by the stage that owns it and is
//! immutable afterwards. Stages hand them downstream by value or shared
//! reference; nothing is mutated after publication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SleuthError;

/// A validated email address split into local part and domain.
///
/// Invariant: exactly one `@`, non-empty parts, domain has at least one
/// dot. Fields are private so the invariant holds for the lifetime of
/// the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    local_part: String,
    domain: String,
}

impl EmailAddress {
    /// Parse and validate a raw address. Fails fast with
    /// [`SleuthError::Validation`] before anything is scheduled.
    pub fn parse(raw: &str) -> Result<Self, SleuthError> {
        let raw = raw.trim();
        let Some((local_part, domain)) = raw.split_once('@') else {
            return Err(SleuthError::Validation(format!(
                "'{}' must contain exactly one '@'",
                raw
            )));
        };
        if domain.contains('@') {
            return Err(SleuthError::Validation(format!(
                "'{}' must contain exactly one '@'",
                raw
            )));
        }
        if local_part.is_empty() {
            return Err(SleuthError::Validation(format!("'{}' has an empty local part", raw)));
        }
        if domain.is_empty() {
            return Err(SleuthError::Validation(format!("'{}' has an empty domain", raw)));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(SleuthError::Validation(format!(
                "'{}' domain must contain an interior dot",
                raw
            )));
        }
        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// The kinds of facts the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Name,
    BirthYear,
    Language,
}

impl FactKind {
    /// Number of trackable kinds; the scorer's richness denominator.
    pub const COUNT: usize = 3;

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BirthYear => "birth year",
            Self::Language => "language",
        }
    }
}

/// Identifies which probe (or the extractor) produced a candidate or
/// result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(String);

/// Well-known id the pattern extractor publishes under.
pub const EXTRACTOR_SOURCE_ID: &str = "pattern.extractor";

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn extractor() -> Self {
        Self(EXTRACTOR_SOURCE_ID.to_string())
    }

    pub fn is_extractor(&self) -> bool {
        self.0 == EXTRACTOR_SOURCE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source categories. The scheduler's per-source concurrency ceiling is
/// applied per category, not per probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    SocialPlatform,
    DevPlatform,
    DomainRegistry,
    BreachIndex,
    Avatar,
}

impl SourceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SocialPlatform => "social platform",
            Self::DevPlatform => "developer platform",
            Self::DomainRegistry => "domain registry",
            Self::BreachIndex => "breach index",
            Self::Avatar => "avatar service",
        }
    }
}

/// A single inferred or confirmed fact with provenance and weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: FactKind,
    pub value: String,
    pub source: SourceId,
    pub weight: u32,
}

impl Candidate {
    pub fn new(kind: FactKind, value: impl Into<String>, source: SourceId, weight: u32) -> Self {
        Self {
            kind,
            value: value.into(),
            source,
            weight,
        }
    }
}

/// Outcome classification for one probe invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Source reachable, subject present.
    Success,
    /// Source reachable, subject absent.
    NotFound,
    /// No answer within budget.
    Timeout,
    /// Network or parse failure, or a fault absorbed at the scheduler
    /// boundary.
    Error,
}

/// Outcome of one probe. Terminal once recorded; the scheduler
/// guarantees at most one per source id per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: SourceId,
    pub category: SourceCategory,
    pub status: ProbeStatus,
    /// Opaque structured payload for renderers. The engine never
    /// interprets it; fact extraction is the probe's own job via
    /// `candidates`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Fact-kind-tagged candidates the probe derived from its payload.
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl SourceResult {
    pub fn success(
        source: SourceId,
        category: SourceCategory,
        payload: Option<serde_json::Value>,
        candidates: Vec<Candidate>,
        latency_ms: u64,
    ) -> Self {
        Self {
            source,
            category,
            status: ProbeStatus::Success,
            payload,
            candidates,
            error: None,
            latency_ms,
        }
    }

    pub fn not_found(source: SourceId, category: SourceCategory, latency_ms: u64) -> Self {
        Self {
            source,
            category,
            status: ProbeStatus::NotFound,
            payload: None,
            candidates: Vec::new(),
            error: None,
            latency_ms,
        }
    }

    pub fn timeout(source: SourceId, category: SourceCategory, latency_ms: u64) -> Self {
        Self {
            source,
            category,
            status: ProbeStatus::Timeout,
            payload: None,
            candidates: Vec::new(),
            error: None,
            latency_ms,
        }
    }

    pub fn error(
        source: SourceId,
        category: SourceCategory,
        message: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            source,
            category,
            status: ProbeStatus::Error,
            payload: None,
            candidates: Vec::new(),
            error: Some(message.into()),
            latency_ms,
        }
    }
}

/// One conflict-resolved fact: the winning values for a kind plus the
/// candidates backing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFact {
    /// Distinct winning values in insertion order. A name resolves to
    /// its full token list ("John", "Developer"); single-valued kinds
    /// hold one entry.
    pub values: Vec<String>,
    /// Cumulative weight of the winning source group.
    pub weight: u32,
    pub supporting: Vec<Candidate>,
}

/// Conflict-resolved merge of all candidates into one fact set.
///
/// Built all-or-nothing after the scheduler returns. `BTreeMap` keeps
/// serialization byte-identical for identical inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub facts: BTreeMap<FactKind, ResolvedFact>,
}

impl AggregatedRecord {
    pub fn get(&self, kind: FactKind) -> Option<&ResolvedFact> {
        self.facts.get(&kind)
    }

    /// Number of resolved fact kinds.
    pub fn patterns_found(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Risk classification for the reputation assessment. Ordered so the
/// worst of several findings can be kept with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Rule-based reputation and risk assessment of the address itself:
/// pattern shape, length, character variety, domain age. Independent of
/// the fact record; a well-formed address on a young domain can score
/// high on reputation factors and still carry a high risk level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationAssessment {
    pub score: u8,
    pub factors: Vec<String>,
    pub risks: Vec<String>,
    pub risk_level: RiskLevel,
}

/// Derived 0-100 confidence metric. Recomputed from scratch whenever the
/// record changes; read-only to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub score: u8,
    pub sources_queried: usize,
    pub sources_succeeded: usize,
    pub patterns_found: usize,
}

/// Final immutable snapshot handed to rendering collaborators. The
/// engine retains no reference after emitting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub email: EmailAddress,
    pub record: AggregatedRecord,
    pub sources: Vec<SourceResult>,
    pub score: ConfidenceScore,
    pub reputation: ReputationAssessment,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}
