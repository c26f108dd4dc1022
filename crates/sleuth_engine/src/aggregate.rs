//! Evidence aggregator - conflict-resolved merge of all candidates.
//!
//! Pure and idempotent: identical candidate/result sets always produce a
//! byte-identical record (sorted maps plus deterministic tie-breaks).

use std::collections::BTreeMap;

use tracing::warn;

use sleuth_common::{AggregatedRecord, Candidate, FactKind, ResolvedFact, SourceId, SourceResult};

/// Merge extractor candidates and probe results into one record.
///
/// For each fact kind the source group with the highest cumulative
/// weight wins; on a tie a probe group beats the extractor group
/// (external confirmation outranks inference), and remaining ties fall
/// to the lowest source id. Kinds with no candidates are simply absent.
pub fn aggregate(candidates: &[Candidate], source_results: &[SourceResult]) -> AggregatedRecord {
    let deduped = dedup_by_source(source_results);

    let mut by_kind: BTreeMap<FactKind, Vec<&Candidate>> = BTreeMap::new();
    for candidate in candidates {
        by_kind.entry(candidate.kind).or_default().push(candidate);
    }
    for result in deduped {
        for candidate in &result.candidates {
            by_kind.entry(candidate.kind).or_default().push(candidate);
        }
    }

    let facts = by_kind
        .into_iter()
        .filter_map(|(kind, pool)| resolve_kind(&pool).map(|fact| (kind, fact)))
        .collect();

    AggregatedRecord { facts }
}

/// Deduplicate results by source id, last write wins.
///
/// The scheduler contract guarantees at most one result per probe per
/// run, so a collision here is an invariant violation: logged, never
/// fatal.
fn dedup_by_source(source_results: &[SourceResult]) -> Vec<&SourceResult> {
    let mut latest: BTreeMap<&SourceId, usize> = BTreeMap::new();
    for (index, result) in source_results.iter().enumerate() {
        if latest.insert(&result.source, index).is_some() {
            warn!(
                "duplicate source result for '{}'; keeping the last one",
                result.source
            );
        }
    }
    let mut indices: Vec<usize> = latest.into_values().collect();
    indices.sort_unstable();
    indices.into_iter().map(|i| &source_results[i]).collect()
}

fn resolve_kind(pool: &[&Candidate]) -> Option<ResolvedFact> {
    // Cumulative weight per source group; BTreeMap gives a stable
    // iteration order for the tie-breaks below.
    let mut groups: BTreeMap<&SourceId, (u32, Vec<&Candidate>)> = BTreeMap::new();
    for candidate in pool {
        let entry = groups.entry(&candidate.source).or_insert((0, Vec::new()));
        entry.0 += candidate.weight;
        entry.1.push(candidate);
    }

    let mut winner: Option<(&SourceId, u32, &Vec<&Candidate>)> = None;
    for (source, (weight, members)) in &groups {
        let beats = match winner {
            None => true,
            Some((best_source, best_weight, _)) => {
                *weight > best_weight
                    // tie: probe evidence outranks the extractor; the
                    // sorted iteration keeps the lowest id otherwise
                    || (*weight == best_weight
                        && best_source.is_extractor()
                        && !source.is_extractor())
            }
        };
        if beats {
            winner = Some((*source, *weight, members));
        }
    }

    let (_, weight, members) = winner?;

    let mut values: Vec<String> = Vec::new();
    for candidate in members {
        if !values.contains(&candidate.value) {
            values.push(candidate.value.clone());
        }
    }

    let supporting = pool
        .iter()
        .filter(|c| values.contains(&c.value))
        .map(|c| (*c).clone())
        .collect();

    Some(ResolvedFact {
        values,
        weight,
        supporting,
    })
}
