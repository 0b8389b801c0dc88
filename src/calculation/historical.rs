//! Period-shifted historical comparison.
//!
//! A current daily series is compared against the same dates shifted back by
//! each configured offset (a week, a month, a year by default). The shifted
//! values come from a [`MetricSource`]; partial availability is expected and
//! averages are taken over whatever resolved.

use chrono::Days;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ComparisonSettings;
use crate::models::{DailyValue, MetricSource};

use super::round_one_decimal;

/// Whether a shifted period resolved enough data to be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    /// Enough days resolved; a change percentage is reported.
    Sufficient,
    /// Some days resolved, but too few to report a change.
    Insufficient,
    /// No shifted day resolved.
    NoData,
}

/// Totals for the current series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Days in the series.
    pub days: u32,
    /// Sum of the values.
    pub total: Decimal,
    /// Mean value per day, rounded to one decimal.
    pub average_per_day: Decimal,
}

/// The comparison against one offset.
///
/// `total` and `average_per_day` are `None` only when nothing resolved.
/// `change_percent` is `None` whenever the sample is not sufficient or the
/// current average is zero; callers must not read that as "no change".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftedComparison {
    /// How many days the current dates were shifted back.
    pub offset_days: u32,
    /// Shifted dates that had a value.
    pub resolved_days: u32,
    /// Sum over the resolved days.
    pub total: Option<Decimal>,
    /// Mean over the resolved days, rounded to one decimal.
    pub average_per_day: Option<Decimal>,
    /// `round((shifted - current) / current * 100)`.
    pub change_percent: Option<i64>,
    /// Outcome of the sample-sufficiency gate.
    pub sample: SampleStatus,
}

/// A current summary and one comparison per configured offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalComparison {
    /// The current series.
    pub current: PeriodSummary,
    /// Comparisons in the order the offsets were configured.
    pub shifted: Vec<ShiftedComparison>,
}

impl HistoricalComparison {
    /// The comparison for a given offset.
    pub fn offset(&self, days: u32) -> Option<&ShiftedComparison> {
        self.shifted.iter().find(|s| s.offset_days == days)
    }
}

/// Summarizes a daily series.
pub fn summarize(series: &[DailyValue]) -> PeriodSummary {
    let total: Decimal = series.iter().map(|point| point.value).sum();
    let days = series.len() as u32;
    let average_per_day = if days == 0 {
        Decimal::ZERO
    } else {
        round_one_decimal(total / Decimal::from(days))
    };
    PeriodSummary {
        days,
        total,
        average_per_day,
    }
}

/// Returns true if `resolved` shifted days are enough to compare against `current_days`.
fn passes_gate(resolved: u32, current_days: u32, settings: &ComparisonSettings) -> bool {
    resolved >= settings.min_days
        || Decimal::from(resolved) >= settings.min_ratio * Decimal::from(current_days)
}

fn change_percent(shifted_avg: Decimal, current_avg: Decimal) -> Option<i64> {
    if current_avg <= Decimal::ZERO {
        return None;
    }
    ((shifted_avg - current_avg) / current_avg * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn compare_offset(
    current: &[DailyValue],
    current_avg: Decimal,
    source: &dyn MetricSource,
    offset_days: u32,
    settings: &ComparisonSettings,
) -> ShiftedComparison {
    let resolved: Vec<Decimal> = current
        .iter()
        .filter_map(|point| point.date.checked_sub_days(Days::new(u64::from(offset_days))))
        .filter_map(|date| source.value_on(date))
        .collect();
    let resolved_days = resolved.len() as u32;

    if resolved_days == 0 {
        return ShiftedComparison {
            offset_days,
            resolved_days,
            total: None,
            average_per_day: None,
            change_percent: None,
            sample: SampleStatus::NoData,
        };
    }

    let total: Decimal = resolved.iter().copied().sum();
    let shifted_avg = total / Decimal::from(resolved_days);

    let (sample, change_percent) = if passes_gate(resolved_days, current.len() as u32, settings) {
        (SampleStatus::Sufficient, change_percent(shifted_avg, current_avg))
    } else {
        (SampleStatus::Insufficient, None)
    };

    ShiftedComparison {
        offset_days,
        resolved_days,
        total: Some(total),
        average_per_day: Some(round_one_decimal(shifted_avg)),
        change_percent,
        sample,
    }
}

/// Compares a current series against each configured offset.
///
/// A change percentage is only reported when the shifted period resolved
/// at least `min_days` days, or at least `min_ratio` of the current
/// period's day count, and the current average is positive.
///
/// # Example
///
/// ```
/// use chrono::{Days, NaiveDate};
/// use rust_decimal::Decimal;
/// use workforce_stats::calculation::{compare, SampleStatus};
/// use workforce_stats::config::ComparisonSettings;
/// use workforce_stats::models::{DailyValue, MetricSeries};
///
/// let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let current: Vec<DailyValue> = (0..10)
///     .map(|i| DailyValue { date: start + Days::new(i), value: Decimal::from(12) })
///     .collect();
/// let history: MetricSeries = current
///     .iter()
///     .map(|p| DailyValue { date: p.date - Days::new(7), value: Decimal::from(10) })
///     .collect();
///
/// let result = compare(&current, &history, &ComparisonSettings::default());
/// let week = result.offset(7).unwrap();
/// assert_eq!(week.sample, SampleStatus::Sufficient);
/// assert_eq!(week.change_percent, Some(-17));
/// assert_eq!(result.offset(365).unwrap().sample, SampleStatus::NoData);
/// ```
pub fn compare(
    current: &[DailyValue],
    source: &dyn MetricSource,
    settings: &ComparisonSettings,
) -> HistoricalComparison {
    let summary = summarize(current);
    let current_avg = if current.is_empty() {
        Decimal::ZERO
    } else {
        summary.total / Decimal::from(summary.days)
    };

    let shifted = settings
        .offsets_days
        .iter()
        .map(|offset| compare_offset(current, current_avg, source, *offset, settings))
        .collect();

    HistoricalComparison {
        current: summary,
        shifted,
    }
}
