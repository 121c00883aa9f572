//! Report output
//!
//! Amounts are rounded to whole units for display only.

use std::fmt::Write as _;
use std::io::Write;
use thiserror::Error;

use super::{limit_share, OverLimitReport, ReportRow};
use crate::types::NumberSummary;

/// Errors writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Round to whole units and group thousands with commas
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Table of per-number aggregates
pub fn render_summary_table(items: &[&NumberSummary]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("No numbers match\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<8} {:<8} {:>8} {:>12} {:>12} {:>10} {}",
        "Number", "Type", "Entries", "Total", "Limit", "% of limit", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(72));
    for item in items {
        let status = if item.is_over_limit { "OVER LIMIT" } else { "ok" };
        let share = limit_share(item)
            .map(|p| format!("{:.0}%", p))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<8} {:<8} {:>8} {:>12} {:>12} {:>10} {}",
            item.number_value,
            item.number_type.as_str(),
            item.total_entries,
            format_money(item.total_amount),
            format_money(item.limit_amount),
            share,
            status
        );
    }
    out
}

/// Full round report as plain text
pub fn render_report(report: &OverLimitReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Round report - draw date {}", report.draw_date.format("%d-%m-%Y"));
    let _ = writeln!(out, "{}", "=".repeat(48));
    let _ = writeln!(out, "{:<28} {:>19}", "Entries", report.total_entries);
    let _ = writeln!(out, "{:<28} {:>19}", "Grand total", format_money(report.grand_total));
    let _ = writeln!(out);

    let _ = writeln!(out, "{:<10} {:>8} {:>14} {:>14}", "Type", "Numbers", "Over limit", "Excess");
    for section in &report.sections {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>14} {:>14}",
            section.number_type.label(),
            section.count(),
            format_money(section.over_limit_amount),
            format_money(section.excess_amount)
        );
    }
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>14} {:>14}",
        "Total",
        report.sections.iter().map(|s| s.count()).sum::<usize>(),
        format_money(report.total_over_limit_amount()),
        format_money(report.total_excess())
    );

    for section in report.sections.iter().filter(|s| !s.rows.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Over limit - {}", section.number_type.label());
        let _ = writeln!(
            out,
            "{:>4} {:<8} {:>12} {:>12} {:>12}",
            "#", "Number", "Total", "Limit", "Excess"
        );
        for (i, row) in section.rows.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4} {:<8} {:>12} {:>12} {:>12}",
                i + 1,
                row.number_value,
                format_money(row.total_amount),
                format_money(row.limit_amount),
                format_money(row.excess)
            );
        }
    }

    out
}

/// Write the report's over-limit rows as CSV, split into pages
pub fn write_csv<W: Write>(
    report: &OverLimitReport,
    rows_per_page: usize,
    writer: W,
) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "page",
        "number_type",
        "number",
        "entries",
        "total_amount",
        "limit_amount",
        "excess",
    ])?;

    for page in report.pages(rows_per_page) {
        for row in &page.rows {
            write_row(&mut csv, page.number, row)?;
        }
    }

    csv.flush()?;
    Ok(())
}

fn write_row<W: Write>(csv: &mut csv::Writer<W>, page: usize, row: &ReportRow) -> Result<(), ReportError> {
    csv.write_record([
        page.to_string(),
        row.number_type.as_str().to_string(),
        row.number_value.clone(),
        row.total_entries.to_string(),
        format!("{:.2}", row.total_amount),
        format!("{:.2}", row.limit_amount),
        format!("{:.2}", row.excess),
    ])?;
    Ok(())
}
