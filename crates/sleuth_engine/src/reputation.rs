//! Reputation and risk assessment - deterministic rules over the
//! address shape and domain age, no LLM or external scoring service.
//!
//! Runs after the scheduler so it can consume the domain registration
//! date a registry probe may have fetched; everything else is derived
//! from the address alone.

use chrono::{DateTime, Utc};
use sleuth_common::{
    EmailAddress, ProbeStatus, ReputationAssessment, RiskLevel, SourceCategory, SourceResult,
};

/// Domains younger than this are flagged as high risk.
const YOUNG_DOMAIN_DAYS: i64 = 365;
/// Local parts shorter than this are easier to enumerate.
const MIN_SAFE_LOCAL_LEN: usize = 6;
/// Reputation score ceiling.
const MAX_SCORE: u32 = 100;

/// Assess an address against the current source results.
pub fn assess(email: &EmailAddress, sources: &[SourceResult]) -> ReputationAssessment {
    assess_with_age(email, domain_age_days(sources, Utc::now()))
}

/// Age-parameterized assessment; the testable core. `None` means the
/// registration date could not be determined.
pub fn assess_with_age(email: &EmailAddress, domain_age: Option<i64>) -> ReputationAssessment {
    let local = email.local_part();
    let mut score: u32 = 0;
    let mut factors = Vec::new();
    let mut risks = Vec::new();
    let mut risk_level = RiskLevel::Low;

    match domain_age {
        Some(age) if age >= YOUNG_DOMAIN_DAYS => {
            score += 20;
            factors.push(format!("domain registered {} days ago", age));
        }
        Some(age) => {
            risks.push(format!("domain registered only {} days ago", age));
            risk_level = risk_level.max(RiskLevel::High);
        }
        None => {
            risks.push("domain age could not be verified".to_string());
            risk_level = risk_level.max(RiskLevel::Medium);
        }
    }

    if is_name_pair_shape(local) {
        score += 15;
        factors.push("firstname.lastname shape".to_string());
        risks.push("full name exposed in the address".to_string());
        risk_level = risk_level.max(RiskLevel::Medium);
    } else if !local.is_empty() && local.chars().all(|c| c.is_ascii_alphabetic()) {
        score += 10;
        factors.push("simple alphabetic shape".to_string());
    }

    if (MIN_SAFE_LOCAL_LEN..=24).contains(&local.chars().count()) {
        score += 10;
        factors.push("appropriate length".to_string());
    }
    if local.chars().count() < MIN_SAFE_LOCAL_LEN {
        risks.push("short local part is easier to guess".to_string());
        risk_level = risk_level.max(RiskLevel::Medium);
    }

    if local.chars().any(|c| c.is_ascii_digit()) {
        risks.push("digits may encode a birth year or date".to_string());
    }

    let variety = character_variety(local);
    score += variety * 5;
    factors.push(format!("character variety: {} classes", variety));

    ReputationAssessment {
        score: score.min(MAX_SCORE) as u8,
        factors,
        risks,
        risk_level,
    }
}

/// Extract the domain age from a successful registry result carrying a
/// `registered` RFC 3339 date in its payload.
pub fn domain_age_days(sources: &[SourceResult], now: DateTime<Utc>) -> Option<i64> {
    sources
        .iter()
        .filter(|r| r.category == SourceCategory::DomainRegistry)
        .filter(|r| r.status == ProbeStatus::Success)
        .find_map(|r| {
            let registered = r.payload.as_ref()?.get("registered")?.as_str()?;
            let parsed = DateTime::parse_from_rfc3339(registered).ok()?;
            Some((now - parsed.with_timezone(&Utc)).num_days())
        })
}

/// `alpha.alpha` with both halves longer than two characters, the shape
/// a firstname.lastname address takes.
fn is_name_pair_shape(local: &str) -> bool {
    match local.split_once('.') {
        Some((first, last)) => {
            first.len() > 2
                && last.len() > 2
                && first.chars().all(|c| c.is_ascii_alphabetic())
                && last.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Count of character classes present: lowercase, uppercase, digits,
/// separators.
fn character_variety(local: &str) -> u32 {
    let classes = [
        local.chars().any(|c| c.is_ascii_lowercase()),
        local.chars().any(|c| c.is_ascii_uppercase()),
        local.chars().any(|c| c.is_ascii_digit()),
        local.chars().any(|c| matches!(c, '.' | '_' | '-')),
    ];
    classes.iter().filter(|present| **present).count() as u32
}
