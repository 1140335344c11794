// Colored terminal output for rankings, attribution scores and drift reports.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here.

use colored::Colorize;

use crate::db::models::AuthorProfile;
use crate::scoring::anomaly::{AnomalyReport, Severity};
use crate::scoring::attribution::{AttributionResult, ConfidenceLevel, RankedAttributions};
use crate::scoring::quality::QualityFlag;

/// Display a ranked attribution list in the terminal.
pub fn display_rankings(ranked: &RankedAttributions, min_confidence: f64) {
    if ranked.profiles_total == 0 {
        println!("No author profiles stored yet. Run `inkprint enroll` first.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Attribution ({} of {} profiles at or above {:.0}) ===",
            ranked.results.len(),
            ranked.profiles_total,
            min_confidence
        )
        .bold()
    );
    if ranked.truncated {
        println!(
            "  {} timed out after scoring {} of {} profiles; results are partial",
            "!".yellow(),
            ranked.profiles_considered,
            ranked.profiles_total
        );
    }
    println!();

    if ranked.results.is_empty() {
        println!("  No profile reached the minimum confidence.");
        return;
    }

    // Header
    println!(
        "  {:>4}  {:<28} {:>6}  {:<12}  {}",
        "Rank".dimmed(),
        "Author".dimmed(),
        "Score".dimmed(),
        "Confidence".dimmed(),
        "Quality".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for (i, result) in ranked.results.iter().enumerate() {
        let name = super::truncate_chars(&result.display_name, 26);
        println!(
            "  {:>4}. {:<28} {:>6.1}  {:<12}  {}",
            i + 1,
            name,
            result.score,
            colorize_level(result.confidence_level),
            format_quality(&result.quality).dimmed(),
        );
    }
    println!();
}

/// Display a single attribution score with its breakdown.
pub fn display_attribution(result: &AttributionResult) {
    println!(
        "\n{}",
        format!(
            "=== Attribution to {} ({}) ===",
            result.display_name, result.candidate_author_id
        )
        .bold()
    );
    println!("  Score: {:.1}/100", result.score);
    println!("  Confidence: {}", colorize_level(result.confidence_level));
    if !result.quality.is_empty() {
        println!("  Quality: {}", format_quality(&result.quality).yellow());
    }

    println!("\n  Breakdown:");
    for (name, value) in result.breakdown.components() {
        println!("    {:<26} {:.3}", name, value);
    }
    println!();
}

/// Display a drift report for one author.
pub fn display_anomaly_report(report: &AnomalyReport) {
    println!(
        "\n{}",
        format!("=== Style drift for {} ===", report.author_id).bold()
    );
    println!("  Severity: {}", colorize_severity(report.severity));
    println!("  Confidence: {:.2}", report.confidence);
    if !report.quality.is_empty() {
        println!("  Quality: {}", format_quality(&report.quality).yellow());
    }
    println!();

    if report.anomalies_detected.is_empty() {
        println!("  {}", "No metric exceeded its threshold.".green());
        return;
    }

    println!(
        "  {:<26} {:>8}  {:>9}",
        "Metric".dimmed(),
        "Delta".dimmed(),
        "Threshold".dimmed()
    );
    for anomaly in &report.anomalies_detected {
        let marker = if anomaly.delta >= anomaly.threshold * 2.0 {
            "!!".red().bold()
        } else {
            "!".yellow()
        };
        println!(
            "  {:<26} {:>8.3}  {:>9.3} {}",
            anomaly.metric.as_str(),
            anomaly.delta,
            anomaly.threshold,
            marker
        );
    }
    println!();
}

/// Display all stored profiles.
pub fn display_profiles(profiles: &[AuthorProfile]) {
    if profiles.is_empty() {
        println!("No author profiles stored yet. Run `inkprint enroll` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Author profiles ({}) ===", profiles.len()).bold()
    );
    println!();
    println!(
        "  {:<38} {:<24} {:>7} {:>8}  {}",
        "Id".dimmed(),
        "Name".dimmed(),
        "Samples".dimmed(),
        "Words".dimmed(),
        "Updated".dimmed(),
    );
    for profile in profiles {
        let age = match profile.age_days() {
            0 => "today".to_string(),
            1 => "1 day ago".to_string(),
            n => format!("{n} days ago"),
        };
        println!(
            "  {:<38} {:<24} {:>7} {:>8}  {}",
            profile.author_id,
            super::truncate_chars(&profile.display_name, 22),
            profile.sample_count,
            profile.fingerprint.sample_word_count,
            age.dimmed()
        );
    }
    println!();
}

fn format_quality(flags: &[QualityFlag]) -> String {
    flags
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Colorize a confidence tier.
fn colorize_level(level: ConfidenceLevel) -> colored::ColoredString {
    let label = level.as_str();
    match level {
        ConfidenceLevel::High => label.green().bold(),
        ConfidenceLevel::Likely => label.green(),
        ConfidenceLevel::Possible => label.yellow(),
        ConfidenceLevel::Inconclusive => label.dimmed(),
    }
}

/// Colorize a drift severity.
fn colorize_severity(severity: Severity) -> colored::ColoredString {
    let label = severity.as_str();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.bright_red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.normal(),
        Severity::None => label.green(),
    }
}
