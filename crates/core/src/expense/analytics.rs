//! Expense summaries and analytics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::ExpenseLine;

/// Totals shown next to an expense list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// Sum of all expenses.
    pub total: Decimal,
    /// Sum per category.
    pub by_category: BTreeMap<&'static str, Decimal>,
    /// Number of expenses.
    pub count: usize,
}

impl ExpenseSummary {
    /// Sums the given expenses.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a ExpenseLine>) -> Self {
        lines
            .into_iter()
            .fold(Self::default(), |mut summary, line| {
                summary.total += line.amount;
                *summary
                    .by_category
                    .entry(line.category.as_str())
                    .or_default() += line.amount;
                summary.count += 1;
                summary
            })
    }
}

/// Total and count for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    /// Sum.
    pub total: Decimal,
    /// Number of expenses.
    pub count: usize,
}

/// Inclusive span of expense dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Earliest expense date.
    pub start: NaiveDate,
    /// Latest expense date.
    pub end: NaiveDate,
    /// Days covered, both ends included.
    pub days: i64,
}

/// Spending analytics for a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseAnalytics {
    /// Sum of all expenses.
    pub total: Decimal,
    /// Per-category totals and counts.
    pub by_category: BTreeMap<&'static str, CategoryTotals>,
    /// Number of expenses.
    pub count: usize,
    /// Total divided by the days covered, rounded to two places.
    pub average_per_day: Decimal,
    /// Covered dates; absent when there are no expenses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl ExpenseAnalytics {
    /// Computes analytics over the given expenses.
    #[must_use]
    pub fn from_lines(lines: &[ExpenseLine]) -> Self {
        let (Some(start), Some(end)) = (
            lines.iter().map(|l| l.date).min(),
            lines.iter().map(|l| l.date).max(),
        ) else {
            return Self::default();
        };

        let mut analytics = Self::default();
        for line in lines {
            analytics.total += line.amount;
            analytics.count += 1;
            let entry = analytics
                .by_category
                .entry(line.category.as_str())
                .or_default();
            entry.total += line.amount;
            entry.count += 1;
        }

        let days = (end - start).num_days() + 1;
        analytics.average_per_day = (analytics.total / Decimal::from(days)).round_dp(2);
        analytics.date_range = Some(DateRange { start, end, days });
        analytics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpenseCategory;
    use rust_decimal_macros::dec;

    fn line(category: ExpenseCategory, amount: Decimal, day: u32) -> ExpenseLine {
        ExpenseLine {
            category,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
        }
    }

    #[test]
    fn test_summary_groups_by_category() {
        let lines = [
            line(ExpenseCategory::Food, dec!(250), 1),
            line(ExpenseCategory::Food, dec!(150.50), 2),
            line(ExpenseCategory::GuideFees, dec!(1000), 2),
        ];
        let summary = ExpenseSummary::from_lines(&lines);

        assert_eq!(summary.total, dec!(1400.50));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.by_category["food"], dec!(400.50));
        assert_eq!(summary.by_category["guide_fees"], dec!(1000));
    }

    #[test]
    fn test_analytics_average_over_inclusive_range() {
        let lines = [
            line(ExpenseCategory::Accommodation, dec!(3000), 1),
            line(ExpenseCategory::Transportation, dec!(1000), 3),
            line(ExpenseCategory::Transportation, dec!(500), 3),
        ];
        let analytics = ExpenseAnalytics::from_lines(&lines);

        assert_eq!(analytics.total, dec!(4500));
        assert_eq!(analytics.average_per_day, dec!(1500));
        let range = analytics.date_range.unwrap();
        assert_eq!(range.days, 3);
        assert_eq!(analytics.by_category["transportation"].count, 2);
        assert_eq!(analytics.by_category["transportation"].total, dec!(1500));
    }

    #[test]
    fn test_analytics_rounds_average() {
        let lines = [
            line(ExpenseCategory::Food, dec!(100), 1),
            line(ExpenseCategory::Food, dec!(0), 3),
        ];
        assert_eq!(
            ExpenseAnalytics::from_lines(&lines).average_per_day,
            dec!(33.33)
        );
    }

    #[test]
    fn test_analytics_empty() {
        let analytics = ExpenseAnalytics::from_lines(&[]);
        assert_eq!(analytics.count, 0);
        assert_eq!(analytics.average_per_day, Decimal::ZERO);
        assert!(analytics.date_range.is_none());
    }
}
