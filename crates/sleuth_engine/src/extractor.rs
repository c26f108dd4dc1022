//! Pattern extractor - rule-based heuristics over the email local part.
//!
//! Pure and deterministic: no I/O, no clock reads except the public
//! wrapper that supplies the current year. On no match the candidate
//! list is simply empty; extraction never fails.

use chrono::Datelike;
use sleuth_common::{Candidate, FactKind, SourceId, SourceWeights};

/// Oldest plausible birth year encoded in a username.
const MIN_BIRTH_YEAR: i32 = 1940;
/// Youngest plausible account holder: current year minus this margin.
const BIRTH_YEAR_MARGIN: i32 = 5;
/// Name tokens shorter than this are discarded as noise.
const MIN_TOKEN_LEN: usize = 2;
/// Two-digit years at or above the pivot expand to 19xx, below to 20xx.
const TWO_DIGIT_PIVOT: u32 = 30;

/// Extract candidates from a local part using the current wall-clock
/// year for birth-year plausibility.
pub fn extract(local_part: &str, weights: &SourceWeights) -> Vec<Candidate> {
    extract_with_year(local_part, chrono::Utc::now().year(), weights)
}

/// Year-parameterized extraction; the testable core.
pub fn extract_with_year(
    local_part: &str,
    current_year: i32,
    weights: &SourceWeights,
) -> Vec<Candidate> {
    let source = SourceId::extractor();
    let (alpha_tokens, digit_runs) = tokenize(local_part);

    let name_tokens: Vec<&str> = alpha_tokens
        .iter()
        .map(|t| t.as_str())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect();

    // firstname.lastname shape earns the pair bonus.
    let name_weight = if name_tokens.len() == 2 {
        weights.name + weights.name_pair_bonus
    } else {
        weights.name
    };

    let mut candidates = Vec::new();
    for token in &name_tokens {
        candidates.push(Candidate::new(
            FactKind::Name,
            capitalize(token),
            source.clone(),
            name_weight,
        ));
    }

    let max_year = current_year - BIRTH_YEAR_MARGIN;
    for run in &digit_runs {
        if let Some(year) = plausible_year(run, max_year) {
            candidates.push(Candidate::new(
                FactKind::BirthYear,
                year.to_string(),
                source.clone(),
                weights.birth_year,
            ));
        }
    }

    // Weak language hint from diacritics; plain ASCII carries no signal
    // and produces nothing.
    if let Some(lang) = language_hint(local_part) {
        candidates.push(Candidate::new(
            FactKind::Language,
            lang,
            source,
            weights.language,
        ));
    }

    candidates
}

/// Script-specific characters betray the likely language of a name.
/// First matching rule wins; ASCII-only input yields no hint.
fn language_hint(local_part: &str) -> Option<&'static str> {
    let lower: String = local_part.chars().flat_map(|c| c.to_lowercase()).collect();
    if lower.chars().any(|c| matches!(c, 'ß' | 'ü' | 'ö' | 'ä')) {
        Some("de")
    } else if lower.chars().any(|c| matches!(c, 'ñ' | 'í' | 'ú')) {
        Some("es")
    } else if lower.chars().any(|c| matches!(c, 'é' | 'è' | 'ê' | 'ç' | 'à' | 'œ')) {
        Some("fr")
    } else {
        None
    }
}

/// Split the local part into alphabetic tokens and digit runs. `.`, `_`,
/// `-`, `+` and any other non-alphanumeric byte act as separators, and a
/// digit run ends an alphabetic token (and vice versa).
fn tokenize(local_part: &str) -> (Vec<String>, Vec<String>) {
    let mut alpha_tokens = Vec::new();
    let mut digit_runs = Vec::new();
    let mut alpha = String::new();
    let mut digits = String::new();

    for ch in local_part.chars() {
        if ch.is_alphabetic() {
            flush(&mut digits, &mut digit_runs);
            alpha.push(ch);
        } else if ch.is_ascii_digit() {
            flush(&mut alpha, &mut alpha_tokens);
            digits.push(ch);
        } else {
            flush(&mut alpha, &mut alpha_tokens);
            flush(&mut digits, &mut digit_runs);
        }
    }
    flush(&mut alpha, &mut alpha_tokens);
    flush(&mut digits, &mut digit_runs);

    (alpha_tokens, digit_runs)
}

fn flush(buf: &mut String, out: &mut Vec<String>) {
    if !buf.is_empty() {
        out.push(std::mem::take(buf));
    }
}

/// Interpret a digit run as a birth year if it lands inside
/// `[MIN_BIRTH_YEAR, max_year]`. Two-digit runs expand via the pivot
/// rule first; other lengths never qualify.
fn plausible_year(run: &str, max_year: i32) -> Option<i32> {
    let year = match run.len() {
        4 => run.parse::<i32>().ok()?,
        2 => {
            let short = run.parse::<u32>().ok()?;
            if short >= TWO_DIGIT_PIVOT {
                1900 + short as i32
            } else {
                2000 + short as i32
            }
        }
        _ => return None,
    };
    (MIN_BIRTH_YEAR..=max_year).contains(&year).then_some(year)
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates
            .iter()
            .filter(|c| c.kind == FactKind::Name)
            .map(|c| c.value.as_str())
            .collect()
    }

    fn years(candidates: &[Candidate]) -> Vec<&str> {
        candidates
            .iter()
            .filter(|c| c.kind == FactKind::BirthYear)
            .map(|c| c.value.as_str())
            .collect()
    }

    #[test]
    fn firstname_lastname_with_year() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("john.developer1995", 2026, &weights);

        assert_eq!(names(&candidates), vec!["John", "Developer"]);
        assert_eq!(years(&candidates), vec!["1995"]);
        // exactly two tokens -> pair bonus applied to both
        for c in candidates.iter().filter(|c| c.kind == FactKind::Name) {
            assert_eq!(c.weight, weights.name + weights.name_pair_bonus);
        }
    }

    #[test]
    fn single_token_gets_base_weight() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("charlotte", 2026, &weights);
        assert_eq!(names(&candidates), vec!["Charlotte"]);
        assert_eq!(candidates[0].weight, weights.name);
    }

    #[test]
    fn three_tokens_get_no_bonus() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("jean_marc_dupont", 2026, &weights);
        assert_eq!(names(&candidates), vec!["Jean", "Marc", "Dupont"]);
        for c in &candidates {
            if c.kind == FactKind::Name {
                assert_eq!(c.weight, weights.name);
            }
        }
    }

    #[test]
    fn short_tokens_are_discarded() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("j.doe", 2026, &weights);
        assert_eq!(names(&candidates), vec!["Doe"]);
    }

    #[test]
    fn token_minimum_counts_characters_not_bytes() {
        let weights = SourceWeights::default();
        // a lone accented initial is still a single character
        let candidates = extract_with_year("é.dubois", 2026, &weights);
        assert_eq!(names(&candidates), vec!["Dubois"]);
    }

    #[test]
    fn four_digit_year_out_of_range_rejected() {
        let weights = SourceWeights::default();
        assert!(years(&extract_with_year("user1890", 2026, &weights)).is_empty());
        assert!(years(&extract_with_year("user2024", 2026, &weights)).is_empty());
        assert_eq!(years(&extract_with_year("user2021", 2026, &weights)), vec!["2021"]);
    }

    #[test]
    fn two_digit_pivot_expansion() {
        let weights = SourceWeights::default();
        // >= 30 -> 19xx
        assert_eq!(years(&extract_with_year("anna87", 2026, &weights)), vec!["1987"]);
        // < 30 -> 20xx, still range-checked
        assert_eq!(years(&extract_with_year("anna05", 2026, &weights)), vec!["2005"]);
        // 2023 would be above current_year - 5
        assert!(years(&extract_with_year("anna23", 2026, &weights)).is_empty());
    }

    #[test]
    fn three_digit_runs_never_qualify() {
        let weights = SourceWeights::default();
        assert!(years(&extract_with_year("user199", 2026, &weights)).is_empty());
    }

    #[test]
    fn diacritics_produce_language_hint() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("jürgen.müller", 2026, &weights);
        let langs: Vec<_> = candidates
            .iter()
            .filter(|c| c.kind == FactKind::Language)
            .collect();
        assert_eq!(langs.len(), 1);
        assert_eq!(langs[0].value, "de");
        assert_eq!(langs[0].weight, weights.language);

        let candidates = extract_with_year("rené.dubois", 2026, &weights);
        assert!(candidates
            .iter()
            .any(|c| c.kind == FactKind::Language && c.value == "fr"));
    }

    #[test]
    fn ascii_local_part_yields_no_language_hint() {
        let weights = SourceWeights::default();
        let candidates = extract_with_year("john.developer", 2026, &weights);
        assert!(candidates.iter().all(|c| c.kind != FactKind::Language));
    }

    #[test]
    fn no_match_yields_empty_sequence() {
        let weights = SourceWeights::default();
        assert!(extract_with_year("x1", 2026, &weights)
            .iter()
            .all(|c| c.kind != FactKind::Name));
        assert!(extract_with_year("...", 2026, &weights).is_empty());
        assert!(extract_with_year("", 2026, &weights).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let weights = SourceWeights::default();
        let a = extract_with_year("maria-garcia_82", 2026, &weights);
        let b = extract_with_year("maria-garcia_82", 2026, &weights);
        assert_eq!(a, b);
    }

    #[test]
    fn all_candidates_carry_extractor_provenance() {
        let weights = SourceWeights::default();
        for c in extract_with_year("pierre.martin1984", 2026, &weights) {
            assert!(c.source.is_extractor());
        }
    }
}
