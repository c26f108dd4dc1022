//! Engine configuration.
//!
//! The engine itself never reads files or environment variables; the CLI
//! loads a TOML file and hands the parsed struct over. Every field has a
//! serde default so a partial (or absent) file still yields a complete
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::SleuthError;
use crate::types::FactKind;

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Global hard deadline for one investigation, in milliseconds.
    /// Once it elapses, outstanding probes are recorded as timeouts.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum in-flight probes per source category.
    #[serde(default = "default_per_source_concurrency")]
    pub per_source_concurrency: usize,

    /// Heuristic weights per fact kind for the pattern extractor.
    #[serde(default)]
    pub source_weights: SourceWeights,

    /// Scoring term weights.
    #[serde(default)]
    pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            per_source_concurrency: default_per_source_concurrency(),
            source_weights: SourceWeights::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the whole configuration. Fatal at configuration time,
    /// before any run starts.
    pub fn validate(&self) -> Result<(), SleuthError> {
        if self.per_source_concurrency == 0 {
            return Err(SleuthError::ScoringConfig(
                "per_source_concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SleuthError::ScoringConfig(
                "timeout_ms must be non-zero".to_string(),
            ));
        }
        self.source_weights.validate()?;
        self.scoring.validate()
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_per_source_concurrency() -> usize {
    4
}

/// Heuristic weight assigned per fact kind by the pattern extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceWeights {
    #[serde(default = "default_name_weight")]
    pub name: u32,

    /// Added to each name token's weight when the local part splits into
    /// exactly two alphabetic tokens (firstname.lastname shape).
    #[serde(default = "default_name_pair_bonus")]
    pub name_pair_bonus: u32,

    #[serde(default = "default_birth_year_weight")]
    pub birth_year: u32,

    #[serde(default = "default_language_weight")]
    pub language: u32,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            name: default_name_weight(),
            name_pair_bonus: default_name_pair_bonus(),
            birth_year: default_birth_year_weight(),
            language: default_language_weight(),
        }
    }
}

impl SourceWeights {
    pub fn for_kind(&self, kind: FactKind) -> u32 {
        match kind {
            FactKind::Name => self.name,
            FactKind::BirthYear => self.birth_year,
            FactKind::Language => self.language,
        }
    }

    fn validate(&self) -> Result<(), SleuthError> {
        if self.name == 0 || self.birth_year == 0 || self.language == 0 {
            return Err(SleuthError::ScoringConfig(
                "source weights must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_name_weight() -> u32 {
    10
}

fn default_name_pair_bonus() -> u32 {
    5
}

fn default_birth_year_weight() -> u32 {
    8
}

fn default_language_weight() -> u32 {
    2
}

/// Fixed weights between the scorer's two terms: source coverage and
/// pattern richness. Both are fractions of the final 0-100 score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_coverage_weight")]
    pub coverage: f64,

    #[serde(default = "default_richness_weight")]
    pub richness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            coverage: default_coverage_weight(),
            richness: default_richness_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), SleuthError> {
        for (label, w) in [("coverage", self.coverage), ("richness", self.richness)] {
            if !(0.0..=1.0).contains(&w) || !w.is_finite() {
                return Err(SleuthError::ScoringConfig(format!(
                    "{} weight {} is outside [0, 1]",
                    label, w
                )));
            }
        }
        if self.coverage + self.richness <= 0.0 {
            return Err(SleuthError::ScoringConfig(
                "coverage and richness weights must not both be zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_coverage_weight() -> f64 {
    0.6
}

fn default_richness_weight() -> f64 {
    0.4
}
