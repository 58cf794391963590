//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the prediction code stays clean and testable
//! - output changes are localized

use crate::domain::{CollegeWithCutoff, PredictionFilters, Probability};
use crate::io::ingest::{Dataset, RowError};

/// Result counts per probability label, in `high, medium, low` order.
pub fn count_by_probability(results: &[CollegeWithCutoff]) -> [(Probability, usize); 3] {
    Probability::ALL.map(|p| (p, results.iter().filter(|r| r.probability == p).count()))
}

/// Header block: request, dataset, and outcome counts.
pub fn format_run_summary(
    filters: Option<&PredictionFilters>,
    dataset: &Dataset,
    source: &str,
    results: &[CollegeWithCutoff],
) -> String {
    let mut out = String::new();

    out.push_str("=== tnea - TNEA Admission Predictor ===\n");
    match filters {
        Some(f) => {
            out.push_str(&format!("Marks: {:.2} / 200 | Category: {}\n", f.marks, f.category));
            out.push_str(&format!(
                "District: {}\n",
                f.preferred_district.as_deref().unwrap_or("any")
            ));
            let types = if f.college_types.is_empty() {
                "any".to_string()
            } else {
                f.college_types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
            };
            out.push_str(&format!("College types: {types}\n"));
            let branches = if f.branch_ids.is_empty() {
                "any".to_string()
            } else {
                f.branch_ids.join(", ")
            };
            out.push_str(&format!("Branches: {branches}\n"));
        }
        None => out.push_str("Request: invalid (missing marks or unknown category/type)\n"),
    }

    out.push_str(&format_dataset_line(dataset, source));

    let counts = count_by_probability(results);
    out.push_str(&format!(
        "Matches: {} (high={}, medium={}, low={})\n",
        results.len(),
        counts[0].1,
        counts[1].1,
        counts[2].1
    ));

    out
}

/// Ranked result table, limited to `top_n` rows (0 = all).
pub fn format_results(results: &[CollegeWithCutoff], top_n: usize) -> String {
    let mut out = String::new();

    if results.is_empty() {
        out.push_str("No colleges found for your criteria.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:>4} {:<36} {:<15} {:<8} {:<6} {:>6} {:>7} {:<7} {:>6} {:>9}\n",
            "#", "college", "district", "type", "branch", "year", "cutoff", "chance", "score", "fees"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<4} {:-<36} {:-<15} {:-<8} {:-<6} {:-<6} {:-<7} {:-<7} {:-<6} {:-<9}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    let shown = if top_n == 0 { results.len() } else { top_n.min(results.len()) };
    for (idx, r) in results.iter().take(shown).enumerate() {
        let latest = r.latest_cutoff();
        out.push_str(
            format!(
                "{:>4} {:<36} {:<15} {:<8} {:<6} {:>6} {:>7} {:<7} {:>6.1} {:>9}\n",
                idx + 1,
                truncate(&r.college.name, 36),
                truncate(&r.college.district, 15),
                r.college.college_type.short_label(),
                truncate(&r.branch.code, 6),
                latest.map(|c| c.year.to_string()).unwrap_or_default(),
                latest.map(|c| format!("{:.2}", c.cutoff_mark)).unwrap_or_default(),
                r.probability.as_str(),
                r.probability_score,
                fmt_rupees(r.fees.total),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if shown < results.len() {
        out.push_str(&format!(
            "... {} more (use --top 0 to show all)\n",
            results.len() - shown
        ));
    }

    out
}

/// Dataset summary for `tnea inspect`.
pub fn format_dataset_summary(dataset: &Dataset, source: &str, max_errors: usize) -> String {
    let mut out = String::new();
    out.push_str("=== tnea - dataset ===\n");
    out.push_str(&format_dataset_line(dataset, source));

    let categories: Vec<&str> = dataset.stats.categories.iter().map(|c| c.code()).collect();
    out.push_str(&format!("Categories: {}\n", categories.join(", ")));
    out.push_str(&format!("Districts: {}\n", dataset.stats.n_districts));
    if dataset.stats.orphan_cutoffs > 0 {
        out.push_str(&format!(
            "Orphan cutoffs (unknown college/branch): {}\n",
            dataset.stats.orphan_cutoffs
        ));
    }

    if !dataset.row_errors.is_empty() {
        out.push_str(&format!("\nRejected rows: {}\n", dataset.row_errors.len()));
        out.push_str(&format_row_errors(&dataset.row_errors, max_errors));
    }
    out
}

pub fn format_row_errors(errors: &[RowError], max: usize) -> String {
    let mut out = String::new();
    for e in errors.iter().take(max) {
        out.push_str(&format!(
            "  {}:{} {}{}\n",
            e.table.file_name(),
            e.line,
            e.id.as_deref().map(|id| format!("[{id}] ")).unwrap_or_default(),
            e.message
        ));
    }
    if errors.len() > max {
        out.push_str(&format!("  ... {} more\n", errors.len() - max));
    }
    out
}

fn format_dataset_line(dataset: &Dataset, source: &str) -> String {
    let s = &dataset.stats;
    let mut line = format!(
        "Data: {source} | colleges={} branches={} cutoffs={} | years {}-{}",
        s.n_colleges, s.n_branches, s.n_cutoffs, s.year_min, s.year_max
    );
    if !dataset.row_errors.is_empty() {
        line.push_str(&format!(" | rejected={}", dataset.row_errors.len()));
    }
    line.push('\n');
    line
}

/// `190000` -> `1,90,000` (Indian digit grouping).
fn fmt_rupees(amount: u32) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (a, b) = rest.split_at(rest.len() - 2);
        groups.push(b);
        rest = a;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
