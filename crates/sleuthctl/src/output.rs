//! Report rendering - clean, ASCII-only terminal output.

use owo_colors::OwoColorize;
use sleuth_common::{ProbeStatus, Report, RiskLevel, SourceResult};

/// Display a finished report.
pub fn render(report: &Report) {
    println!();
    println!("{} {}", "[REPORT]".bold(), report.email.to_string().bold());
    println!();

    render_signals(report);
    render_sources(report);
    render_reputation(report);
    render_confidence(report);
}

fn render_signals(report: &Report) {
    println!("[SIGNALS]");
    if report.record.is_empty() {
        println!("  (no identity signals resolved)");
    }
    for (kind, fact) in &report.record.facts {
        println!(
            "  {:<12} {}  (weight {}, {} supporting)",
            kind.label(),
            fact.values.join(" ").bright_green(),
            fact.weight,
            fact.supporting.len()
        );
    }
    println!();
}

fn render_sources(report: &Report) {
    if report.sources.is_empty() {
        return;
    }
    println!("[SOURCES]");

    // alphabetical for a stable read, not arrival order
    let mut sources: Vec<&SourceResult> = report.sources.iter().collect();
    sources.sort_by(|a, b| a.source.as_str().cmp(b.source.as_str()));

    for result in sources {
        let mut line = format!(
            "  {:<10} {:<20} {:>5}ms",
            status_tag(result.status),
            result.source,
            result.latency_ms
        );
        if let Some(error) = &result.error {
            line.push_str(&format!("  {}", error.bright_red()));
        } else if let Some(url) = result
            .payload
            .as_ref()
            .and_then(|p| p.get("url"))
            .and_then(|u| u.as_str())
        {
            line.push_str(&format!("  {}", url.cyan()));
        }
        println!("{line}");
    }
    println!();
}

fn render_reputation(report: &Report) {
    let assessment = &report.reputation;

    println!("[REPUTATION]");
    println!("  score            {}/100", assessment.score);
    println!("  risk level       {}", risk_tag(assessment.risk_level));
    for factor in &assessment.factors {
        println!("  + {}", factor);
    }
    for risk in &assessment.risks {
        println!("  - {}", risk.yellow());
    }
    println!();
}

fn risk_tag(level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => level.label().bright_green().to_string(),
        RiskLevel::Medium => level.label().yellow().to_string(),
        RiskLevel::High => level.label().bright_red().to_string(),
    }
}

fn render_confidence(report: &Report) {
    let score = &report.score;
    let colored = if score.score >= 70 {
        score.score.bright_green().to_string()
    } else if score.score >= 40 {
        score.score.yellow().to_string()
    } else {
        score.score.bright_red().to_string()
    };

    println!("[CONFIDENCE]");
    println!("  score            {}/100", colored);
    println!("  patterns found   {}", score.patterns_found);
    println!(
        "  sources          {}/{} succeeded",
        score.sources_succeeded, score.sources_queried
    );
    println!("  processing time  {}ms", report.elapsed_ms);
    println!();
}

fn status_tag(status: ProbeStatus) -> String {
    match status {
        ProbeStatus::Success => "[HIT]".bright_green().to_string(),
        ProbeStatus::NotFound => "[MISS]".to_string(),
        ProbeStatus::Timeout => "[TIMEOUT]".yellow().to_string(),
        ProbeStatus::Error => "[ERROR]".bright_red().to_string(),
    }
}
