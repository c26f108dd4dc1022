//! Report assembler.
//!
//! Pure, non-failing composition; the only place elapsed wall-clock
//! time is captured and frozen into the result.

use std::time::Duration;

use chrono::Utc;
use sleuth_common::{
    AggregatedRecord, ConfidenceScore, EmailAddress, Report, ReputationAssessment, SourceResult,
};

pub fn assemble(
    email: EmailAddress,
    record: AggregatedRecord,
    sources: Vec<SourceResult>,
    score: ConfidenceScore,
    reputation: ReputationAssessment,
    elapsed: Duration,
) -> Report {
    Report {
        email,
        record,
        sources,
        score,
        reputation,
        elapsed_ms: elapsed.as_millis() as u64,
        generated_at: Utc::now(),
    }
}
