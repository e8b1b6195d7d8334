//! Text report generation.
//!
//! This module renders the human-readable statistics report: overall
//! counts, per-variant votes with percentage bars, then per-product and
//! per-user breakdowns.

use crate::analysis::{percentage, Aggregate, Tally};
use chrono::{DateTime, Local};

const RULE_WIDTH: usize = 60;
/// Cells in a full bar; one cell per two percentage points.
const BAR_WIDTH: usize = 50;

/// Generate the complete text report.
pub fn generate_text_report(agg: &Aggregate, generated_at: DateTime<Local>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.extend(generate_header(generated_at));
    lines.extend(generate_overview_section(agg));
    lines.extend(generate_version_section(agg));
    lines.extend(generate_product_section(agg));
    lines.extend(generate_user_section(agg));
    lines.push("=".repeat(RULE_WIDTH));

    lines.join("\n")
}

fn generate_header(generated_at: DateTime<Local>) -> Vec<String> {
    vec![
        "=".repeat(RULE_WIDTH),
        "           众测结果统计报告".to_string(),
        "=".repeat(RULE_WIDTH),
        format!("生成时间: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ]
}

fn generate_overview_section(agg: &Aggregate) -> Vec<String> {
    vec![
        "【总体统计】".to_string(),
        format!("  参与用户数: {}", agg.total_voters),
        format!("  总评测数: {}", agg.total_evaluations),
        String::new(),
    ]
}

/// Votes per variant, as a share of all decisive ballots.
fn generate_version_section(agg: &Aggregate) -> Vec<String> {
    let mut section = vec!["【各版本得票统计】".to_string()];
    let total = agg.total_evaluations;

    for label in agg.version_counts.labels_for_report() {
        let count = agg.version_counts.get(&label);
        let pct = percentage(count, total);
        section.push(format!(
            "  {:12}: {:4} 票 ({:5.1}%) {}",
            label.display_name(),
            count,
            pct,
            bar(pct)
        ));
    }
    section.push(String::new());

    section
}

/// Per product, percentages are relative to that product's own vote total.
fn generate_product_section(agg: &Aggregate) -> Vec<String> {
    let mut section = vec!["【各商品统计】".to_string()];

    for (product_id, tally) in agg.sorted_products() {
        section.push(format!("  商品{}:", product_id));
        section.extend(product_lines(tally));
        section.push(String::new());
    }

    section
}

fn product_lines(tally: &Tally) -> Vec<String> {
    let total = tally.total();
    tally
        .labels_for_report()
        .iter()
        .map(|label| {
            let count = tally.get(label);
            format!(
                "    {:12}: {:2} 票 ({:5.1}%)",
                label.display_name(),
                count,
                percentage(count, total)
            )
        })
        .collect()
}

/// Users by id, listing only the variants they voted for.
fn generate_user_section(agg: &Aggregate) -> Vec<String> {
    let mut section = vec!["【用户统计】".to_string()];

    for (user_id, tally) in &agg.user_counts {
        section.push(format!("  用户 [{}] (共 {} 票):", user_id, tally.total()));
        for label in tally.labels_for_report() {
            let count = tally.get(&label);
            if count > 0 {
                section.push(format!("    {}: {} 票", label.display_name(), count));
            }
        }
        section.push(String::new());
    }

    section
}

/// Proportional bar, capped at [`BAR_WIDTH`] cells.
fn bar(pct: f64) -> String {
    let filled = ((pct / 2.0) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
