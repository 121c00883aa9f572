//! Over-limit reporting
//!
//! Re-arranges the service's per-number aggregates into the printed round
//! report: which numbers went over their type's limit, by how much, and the
//! round's grand total. Rows can be split into fixed-size pages for export.
//!
//! - **format**: money formatting, terminal tables, CSV export

pub mod format;

pub use format::{format_money, render_report, render_summary_table, write_csv, ReportError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{NumberSummary, NumberType, RoundId, RoundSummary};

/// Report tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Rows per exported page
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
}

fn default_rows_per_page() -> usize {
    25
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
        }
    }
}

/// Which summaries to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    /// Restrict to one number type
    pub number_type: Option<NumberType>,
    /// Only numbers flagged over limit
    pub over_limit_only: bool,
}

impl SummaryFilter {
    pub fn matches(&self, item: &NumberSummary) -> bool {
        if let Some(number_type) = self.number_type {
            if item.number_type != number_type {
                return false;
            }
        }
        !self.over_limit_only || item.is_over_limit
    }

    /// Matching summaries, largest total first
    pub fn apply<'a>(&self, items: &'a [NumberSummary]) -> Vec<&'a NumberSummary> {
        let mut picked: Vec<&NumberSummary> =
            items.iter().filter(|item| self.matches(item)).collect();
        picked.sort_by(|a, b| {
            b.total_amount
                .partial_cmp(&a.total_amount)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.number_value.cmp(&b.number_value))
        });
        picked
    }
}

/// Total as a percentage of the limit; `None` without a positive limit
pub fn limit_share(item: &NumberSummary) -> Option<f64> {
    if item.limit_amount > 0.0 {
        Some(item.total_amount / item.limit_amount * 100.0)
    } else {
        None
    }
}

/// Amount wagered beyond the limit; zero unless flagged over a positive limit
pub fn over_limit_excess(item: &NumberSummary) -> f64 {
    if item.is_over_limit && item.limit_amount > 0.0 {
        item.total_amount - item.limit_amount
    } else {
        0.0
    }
}

/// One number in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub number_value: String,
    pub number_type: NumberType,
    pub total_entries: u64,
    pub total_amount: f64,
    pub limit_amount: f64,
    pub excess: f64,
}

impl From<&NumberSummary> for ReportRow {
    fn from(item: &NumberSummary) -> Self {
        Self {
            number_value: item.number_value.clone(),
            number_type: item.number_type,
            total_entries: item.total_entries,
            total_amount: item.total_amount,
            limit_amount: item.limit_amount,
            excess: over_limit_excess(item),
        }
    }
}

/// Over-limit numbers of one type, largest excess first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSection {
    pub number_type: NumberType,
    pub rows: Vec<ReportRow>,
    /// Sum of `total_amount` over the rows
    pub over_limit_amount: f64,
    /// Sum of `excess` over the rows
    pub excess_amount: f64,
}

impl TypeSection {
    fn build(number_type: NumberType, summaries: &[NumberSummary]) -> Self {
        let mut rows: Vec<ReportRow> = summaries
            .iter()
            .filter(|item| item.number_type == number_type && item.is_over_limit)
            .map(ReportRow::from)
            .collect();

        rows.sort_by(|a, b| {
            b.excess
                .partial_cmp(&a.excess)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.number_value.cmp(&b.number_value))
        });

        Self {
            number_type,
            over_limit_amount: rows.iter().map(|r| r.total_amount).sum(),
            excess_amount: rows.iter().map(|r| r.excess).sum(),
            rows,
        }
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Printed report for one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverLimitReport {
    pub round_id: RoundId,
    pub draw_date: NaiveDate,
    pub total_entries: u64,
    /// Everything wagered in the round, as reported by the service
    pub grand_total: f64,
    pub over_limit_count: u64,
    /// One section per number type, in [`NumberType::ALL`] order
    pub sections: Vec<TypeSection>,
}

impl OverLimitReport {
    pub fn build(round: &RoundSummary, summaries: &[NumberSummary]) -> Self {
        Self {
            round_id: round.round_id,
            draw_date: round.draw_date,
            total_entries: round.total_entries,
            grand_total: round.total_amount,
            over_limit_count: round.over_limit_count,
            sections: NumberType::ALL
                .iter()
                .map(|t| TypeSection::build(*t, summaries))
                .collect(),
        }
    }

    pub fn section(&self, number_type: NumberType) -> Option<&TypeSection> {
        self.sections.iter().find(|s| s.number_type == number_type)
    }

    pub fn total_over_limit_amount(&self) -> f64 {
        self.sections.iter().map(|s| s.over_limit_amount).sum()
    }

    pub fn total_excess(&self) -> f64 {
        self.sections.iter().map(|s| s.excess_amount).sum()
    }

    /// All rows in section order
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }

    /// Split all rows into pages of `rows_per_page`
    pub fn pages(&self, rows_per_page: usize) -> Vec<ReportPage<ReportRow>> {
        let rows: Vec<ReportRow> = self.rows().cloned().collect();
        paginate(&rows, rows_per_page)
    }
}

/// One fixed-size slice of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPage<T> {
    /// 1-based page number
    pub number: usize,
    pub page_count: usize,
    pub rows: Vec<T>,
}

/// Split `rows` into consecutive pages of at most `rows_per_page` rows.
///
/// Always returns at least one page. A `rows_per_page` of zero is treated
/// as one.
pub fn paginate<T: Clone>(rows: &[T], rows_per_page: usize) -> Vec<ReportPage<T>> {
    let size = rows_per_page.max(1);
    if rows.is_empty() {
        return vec![ReportPage {
            number: 1,
            page_count: 1,
            rows: Vec::new(),
        }];
    }

    let page_count = rows.len().div_ceil(size);
    rows.chunks(size)
        .enumerate()
        .map(|(i, chunk)| ReportPage {
            number: i + 1,
            page_count,
            rows: chunk.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(number: &str, t: NumberType, total: f64, limit: f64, over: bool) -> NumberSummary {
        NumberSummary {
            number_value: number.to_string(),
            number_type: t,
            total_entries: 1,
            total_amount: total,
            limit_amount: limit,
            is_over_limit: over,
        }
    }

    fn round() -> RoundSummary {
        RoundSummary {
            round_id: 9,
            draw_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            status: "open".to_string(),
            total_entries: 40,
            total_amount: 12_345.6,
            over_limit_count: 3,
        }
    }

    fn sample() -> Vec<NumberSummary> {
        vec![
            summary("12", NumberType::TwoDigit, 1500.0, 1000.0, true),
            summary("34", NumberType::TwoDigit, 800.0, 1000.0, false),
            summary("56", NumberType::TwoDigit, 3000.0, 1000.0, true),
            summary("123", NumberType::ThreeDigit, 700.0, 500.0, true),
            summary("999", NumberType::ThreeDigit, 100.0, 0.0, true),
        ]
    }

    #[test]
    fn test_excess() {
        assert_eq!(over_limit_excess(&summary("12", NumberType::TwoDigit, 1500.0, 1000.0, true)), 500.0);
        assert_eq!(over_limit_excess(&summary("12", NumberType::TwoDigit, 1500.0, 1000.0, false)), 0.0);
        assert_eq!(over_limit_excess(&summary("12", NumberType::TwoDigit, 1500.0, 0.0, true)), 0.0);
    }

    #[test]
    fn test_filter() {
        let items = sample();
        let all = SummaryFilter::default().apply(&items);
        assert_eq!(all.len(), 5);

        let filter = SummaryFilter {
            number_type: Some(NumberType::TwoDigit),
            over_limit_only: true,
        };
        let picked: Vec<&str> = filter.apply(&items).iter().map(|s| s.number_value.as_str()).collect();
        assert_eq!(picked, vec!["56", "12"]);
    }

    #[test]
    fn test_filter_orders_by_total() {
        let items = sample();
        let order: Vec<&str> = SummaryFilter::default()
            .apply(&items)
            .iter()
            .map(|s| s.number_value.as_str())
            .collect();
        assert_eq!(order, vec!["56", "12", "34", "123", "999"]);
    }

    #[test]
    fn test_limit_share() {
        assert_eq!(limit_share(&summary("12", NumberType::TwoDigit, 1500.0, 1000.0, true)), Some(150.0));
        assert_eq!(limit_share(&summary("999", NumberType::ThreeDigit, 100.0, 0.0, true)), None);
    }

    #[test]
    fn test_report_sections_sorted_by_excess() {
        let report = OverLimitReport::build(&round(), &sample());

        let two = report.section(NumberType::TwoDigit).unwrap();
        let numbers: Vec<&str> = two.rows.iter().map(|r| r.number_value.as_str()).collect();
        assert_eq!(numbers, vec!["56", "12"]);
        assert_eq!(two.over_limit_amount, 4500.0);
        assert_eq!(two.excess_amount, 2500.0);

        let three = report.section(NumberType::ThreeDigit).unwrap();
        assert_eq!(three.count(), 2);
        assert_eq!(three.rows[0].number_value, "123");
        assert_eq!(three.excess_amount, 200.0);

        assert_eq!(report.total_over_limit_amount(), 5300.0);
        assert_eq!(report.total_excess(), 2700.0);
        assert_eq!(report.grand_total, 12_345.6);
    }

    #[test]
    fn test_paginate_covers_every_row_once() {
        let rows: Vec<u32> = (0..53).collect();
        let pages = paginate(&rows, 25);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].rows.len(), 3);
        assert!(pages.iter().all(|p| p.page_count == 3));
        let flat: Vec<u32> = pages.into_iter().flat_map(|p| p.rows).collect();
        assert_eq!(flat, rows);
    }

    #[test]
    fn test_paginate_edges() {
        let empty: Vec<u32> = Vec::new();
        let pages = paginate(&empty, 10);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].rows.is_empty());

        let pages = paginate(&[1, 2, 3], 0);
        assert_eq!(pages.len(), 3);

        let pages = paginate(&[1, 2, 3, 4], 2);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].number, 2);
    }

    #[test]
    fn test_report_pages() {
        let report = OverLimitReport::build(&round(), &sample());
        let pages = report.pages(3);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].rows[0].number_value, "56");
        assert_eq!(pages[1].rows[0].number_value, "999");
    }
}
