//! Confidence scorer - weighted combination of source coverage and
//! pattern richness.
//!
//! Pure function scoring, deterministic given identical inputs. The two
//! term weights are configuration, never inline constants.

use sleuth_common::{AggregatedRecord, ConfidenceScore, FactKind, ProbeStatus, ScoringWeights, SourceResult};

/// Compute the 0-100 confidence score for an aggregated record.
///
/// `score = coverage_w * 100 * succeeded/queried
///        + richness_w * 100 * patterns/FactKind::COUNT`,
/// rounded and clamped to `[0, 100]`. With zero probes queried the
/// coverage term contributes nothing and the score reflects richness
/// alone.
pub fn score(
    record: &AggregatedRecord,
    source_results: &[SourceResult],
    weights: &ScoringWeights,
) -> ConfidenceScore {
    let sources_queried = source_results.len();
    let sources_succeeded = source_results
        .iter()
        .filter(|r| r.status == ProbeStatus::Success)
        .count();
    let patterns_found = record.patterns_found();

    let coverage = if sources_queried == 0 {
        0.0
    } else {
        sources_succeeded as f64 / sources_queried as f64
    };
    let richness = patterns_found as f64 / FactKind::COUNT as f64;

    let raw = weights.coverage * 100.0 * coverage + weights.richness * 100.0 * richness;
    let score = raw.round().clamp(0.0, 100.0) as u8;

    ConfidenceScore {
        score,
        sources_queried,
        sources_succeeded,
        patterns_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_common::{Candidate, ResolvedFact, SourceCategory, SourceId};
    use std::collections::BTreeMap;

    fn record_with_patterns(n: usize) -> AggregatedRecord {
        let kinds = [FactKind::Name, FactKind::BirthYear, FactKind::Language];
        let mut facts = BTreeMap::new();
        for kind in kinds.into_iter().take(n) {
            facts.insert(
                kind,
                ResolvedFact {
                    values: vec!["x".to_string()],
                    weight: 10,
                    supporting: vec![Candidate::new(kind, "x", SourceId::extractor(), 10)],
                },
            );
        }
        AggregatedRecord { facts }
    }

    fn results(success: usize, timeout: usize, error: usize) -> Vec<SourceResult> {
        let mut out = Vec::new();
        for i in 0..success {
            out.push(SourceResult::success(
                SourceId::new(format!("ok{i}")),
                SourceCategory::SocialPlatform,
                None,
                vec![],
                5,
            ));
        }
        for i in 0..timeout {
            out.push(SourceResult::timeout(
                SourceId::new(format!("to{i}")),
                SourceCategory::SocialPlatform,
                200,
            ));
        }
        for i in 0..error {
            out.push(SourceResult::error(
                SourceId::new(format!("err{i}")),
                SourceCategory::SocialPlatform,
                "boom",
                5,
            ));
        }
        out
    }

    #[test]
    fn zero_probes_scores_richness_only() {
        let weights = ScoringWeights::default();
        let s = score(&record_with_patterns(2), &[], &weights);

        assert_eq!(s.sources_queried, 0);
        assert_eq!(s.sources_succeeded, 0);
        assert_eq!(s.patterns_found, 2);
        // 0.4 * 100 * 2/3
        assert_eq!(s.score, 27);
    }

    #[test]
    fn mixed_outcomes_count_only_success() {
        let weights = ScoringWeights::default();
        let s = score(&record_with_patterns(3), &results(6, 2, 2), &weights);

        assert_eq!(s.sources_queried, 10);
        assert_eq!(s.sources_succeeded, 6);
        // 0.6 * 100 * 0.6 + 0.4 * 100 * 1.0 = 76
        assert_eq!(s.score, 76);
    }

    #[test]
    fn all_failures_still_in_range() {
        let weights = ScoringWeights::default();
        let s = score(&record_with_patterns(0), &results(0, 5, 5), &weights);
        assert_eq!(s.score, 0);
        assert_eq!(s.sources_succeeded, 0);
    }

    #[test]
    fn perfect_run_caps_at_100() {
        let weights = ScoringWeights {
            coverage: 1.0,
            richness: 1.0,
        };
        let s = score(&record_with_patterns(3), &results(4, 0, 0), &weights);
        assert_eq!(s.score, 100);
    }

    #[test]
    fn score_always_within_bounds() {
        let weights = ScoringWeights::default();
        for succeeded in 0..=4 {
            for patterns in 0..=3 {
                let s = score(
                    &record_with_patterns(patterns),
                    &results(succeeded, 4 - succeeded, 0),
                    &weights,
                );
                assert!(s.score <= 100);
            }
        }
    }

    #[test]
    fn deterministic_given_identical_inputs() {
        let weights = ScoringWeights::default();
        let record = record_with_patterns(2);
        let rs = results(3, 1, 1);
        assert_eq!(score(&record, &rs, &weights), score(&record, &rs, &weights));
    }
}
